use crate::error::{Error, Result};
use crate::raster::Raster;
use crate::types::Axis;

/// Mirror a raster along `axis`. Alpha travels with its pixel.
pub fn flip(raster: &Raster, axis: Axis) -> Raster {
    let channels = raster.channels();
    let row_len = raster.width() as usize * channels;
    let src = raster.samples();
    let mut out = Vec::with_capacity(src.len());

    match axis {
        Axis::Vertical => {
            for row in src.chunks_exact(row_len).rev() {
                out.extend_from_slice(row);
            }
        }
        Axis::Horizontal => {
            for row in src.chunks_exact(row_len) {
                for px in row.chunks_exact(channels).rev() {
                    out.extend_from_slice(px);
                }
            }
        }
    }

    raster.with_samples(out)
}

/// Rewrite every pixel whose alpha is exactly `from` to alpha `to`.
///
/// Fully transparent pixels are never touched, so `from` must be non-zero.
pub fn remap_alpha(raster: &Raster, from: u8, to: u8) -> Result<Raster> {
    if !raster.has_alpha() {
        return Err(Error::NoAlphaChannel);
    }
    if from == 0 {
        return Err(Error::Configuration(
            "alpha 0 pixels cannot be remapped".to_string(),
        ));
    }

    let mut samples = raster.samples().to_vec();
    for px in samples.chunks_exact_mut(4) {
        if px[3] == from {
            px[3] = to;
        }
    }

    Ok(raster.with_samples(samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelMode;

    fn sample_rgba() -> Raster {
        // 3x2, every pixel distinct, varied alpha
        let samples = (0..6u8).flat_map(|i| [i, i * 10, i * 20, 40 * i + 5]).collect();
        Raster::new(3, 2, ChannelMode::Rgba, samples).unwrap()
    }

    #[test]
    fn test_vertical_flip_swaps_rows() {
        let raster = sample_rgba();
        let flipped = flip(&raster, Axis::Vertical);

        assert_eq!(flipped.pixel(0, 0), raster.pixel(0, 1));
        assert_eq!(flipped.pixel(2, 1), raster.pixel(2, 0));
    }

    #[test]
    fn test_horizontal_flip_swaps_columns() {
        let raster = sample_rgba();
        let flipped = flip(&raster, Axis::Horizontal);

        assert_eq!(flipped.pixel(0, 0), raster.pixel(2, 0));
        assert_eq!(flipped.pixel(1, 1), raster.pixel(1, 1));
        assert_eq!(flipped.pixel(2, 1), raster.pixel(0, 1));
    }

    #[test]
    fn test_flip_is_involutive() {
        let rgba = sample_rgba();
        let rgb = Raster::new(2, 3, ChannelMode::Rgb, (0..18).collect()).unwrap();

        for raster in [rgba, rgb] {
            for axis in [Axis::Vertical, Axis::Horizontal] {
                assert_eq!(flip(&flip(&raster, axis), axis), raster);
            }
        }
    }

    #[test]
    fn test_remap_half_alpha_to_solid_and_back() {
        let raster = Raster::new(
            3,
            1,
            ChannelMode::Rgba,
            vec![1, 1, 1, 128, 2, 2, 2, 0, 3, 3, 3, 64],
        )
        .unwrap();

        let solid = remap_alpha(&raster, 128, 255).unwrap();
        assert_eq!(solid.samples(), &[1, 1, 1, 255, 2, 2, 2, 0, 3, 3, 3, 64]);

        let restored = remap_alpha(&solid, 255, 128).unwrap();
        assert_eq!(restored, raster);
    }

    #[test]
    fn test_remap_rejects_zero_source_and_rgb() {
        let rgba = sample_rgba();
        assert!(matches!(remap_alpha(&rgba, 0, 255), Err(Error::Configuration(_))));

        let rgb = Raster::new(1, 1, ChannelMode::Rgb, vec![0, 0, 0]).unwrap();
        assert!(matches!(remap_alpha(&rgb, 128, 255), Err(Error::NoAlphaChannel)));
    }
}
