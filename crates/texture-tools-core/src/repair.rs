//! Transparency repair: rewriting the colour hidden under alpha=0.
//!
//! Upscalers and mip generators bleed whatever RGB sits under transparent
//! texels into visible edges. Edge-extend fills those texels with the colour
//! of the nearest visible texel; solid fill uses one configured colour.

use log::warn;
use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::raster::Raster;
use crate::types::{FillAlpha, FillColor, FillPolicy};

/// Non-fatal conditions reported alongside a repaired raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairWarning {
    /// Edge-extend found no pixel with alpha > 0 to copy from; raster unchanged
    NoOpaquePixels,
}

/// Output of a repair pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repaired {
    pub raster: Raster,
    pub warning: Option<RepairWarning>,
}

/// Replace the RGB of every alpha=0 pixel according to `policy`.
///
/// Pixels with alpha > 0 are never changed.
pub fn repair_transparency(
    raster: &Raster,
    policy: &FillPolicy,
    fill_alpha: FillAlpha,
) -> Result<Repaired> {
    if !raster.has_alpha() {
        return Err(Error::NoAlphaChannel);
    }

    let fills = match policy {
        FillPolicy::Solid(color) => solid_fill(raster, *color),
        FillPolicy::EdgeExtend => match edge_extend_sources(raster) {
            Some(fills) => fills,
            None => {
                warn!(
                    "No opaque pixels in {}x{} raster, leaving it unchanged",
                    raster.width(),
                    raster.height()
                );
                return Ok(Repaired {
                    raster: raster.clone(),
                    warning: Some(RepairWarning::NoOpaquePixels),
                });
            }
        },
    };

    let new_alpha = match fill_alpha {
        FillAlpha::Keep => 0,
        FillAlpha::Opaque => 255,
    };

    let mut samples = raster.samples().to_vec();
    for (px, rgb) in samples.chunks_exact_mut(4).zip(fills) {
        if let Some([r, g, b]) = rgb {
            px[0] = r;
            px[1] = g;
            px[2] = b;
            px[3] = new_alpha;
        }
    }

    Ok(Repaired {
        raster: raster.with_samples(samples),
        warning: None,
    })
}

/// Per-pixel replacement colour for a solid fill
fn solid_fill(raster: &Raster, color: FillColor) -> Vec<Option<[u8; 3]>> {
    raster
        .pixels()
        .map(|px| (px[3] == 0).then(|| color.rgb()))
        .collect()
}

/// Per-pixel replacement colour taken from the nearest visible pixel.
///
/// Multi-source breadth-first propagation over the 8-connected grid, so
/// distance is Chebyshev. Among equally near sources the one earliest in
/// raster scan order wins. Returns `None` when nothing is visible.
fn edge_extend_sources(raster: &Raster) -> Option<Vec<Option<[u8; 3]>>> {
    const UNSEEN: u32 = u32::MAX;

    let width = raster.width() as usize;
    let height = raster.height() as usize;
    let samples = raster.samples();
    let alpha = |i: usize| samples[i * 4 + 3];

    // Index of the source pixel each cell takes its colour from
    let mut source = vec![0usize; width * height];
    let mut distance = vec![UNSEEN; width * height];
    let mut frontier = VecDeque::new();

    for i in 0..width * height {
        if alpha(i) > 0 {
            source[i] = i;
            distance[i] = 0;
            frontier.push_back(i);
        }
    }

    if frontier.is_empty() {
        return None;
    }

    while let Some(cell) = frontier.pop_front() {
        let (x, y) = ((cell % width) as isize, (cell / width) as isize);
        let next = distance[cell] + 1;

        for dy in -1..=1isize {
            for dx in -1..=1isize {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                let neighbour = ny as usize * width + nx as usize;

                if distance[neighbour] == UNSEEN {
                    distance[neighbour] = next;
                    source[neighbour] = source[cell];
                    frontier.push_back(neighbour);
                } else if distance[neighbour] == next && source[cell] < source[neighbour] {
                    source[neighbour] = source[cell];
                }
            }
        }
    }

    let fills = (0..width * height)
        .map(|i| {
            (alpha(i) == 0).then(|| {
                let s = source[i] * 4;
                [samples[s], samples[s + 1], samples[s + 2]]
            })
        })
        .collect();

    Some(fills)
}

/// Undo a solid fill: every pixel exactly matching `color` at full opacity
/// becomes `(0, 0, 0, 0)`
pub fn restore_transparency(raster: &Raster, color: FillColor) -> Result<Raster> {
    if !raster.has_alpha() {
        return Err(Error::NoAlphaChannel);
    }

    let target = [color.r, color.g, color.b, 255];
    let mut samples = raster.samples().to_vec();
    for px in samples.chunks_exact_mut(4) {
        if *px == target {
            px.copy_from_slice(&[0, 0, 0, 0]);
        }
    }

    Ok(raster.with_samples(samples))
}
