//! Decoded pixel grids and the PNG boundary.
//!
//! Every other module works on [`Raster`] values only, so source encodings
//! (palette, grayscale, grayscale+alpha) are normalised here to 8-bit RGB or
//! RGBA and never seen downstream.

use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageEncoder, ImageFormat};
use log::debug;
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::ChannelMode;

/// A decoded, immutable, row-major grid of 8-bit samples
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    mode: ChannelMode,
    samples: Vec<u8>,
}

impl Raster {
    /// Build a raster, checking that the buffer matches the dimensions
    pub fn new(width: u32, height: u32, mode: ChannelMode, samples: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidRaster(format!(
                "dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(mode.channels()))
            .ok_or_else(|| Error::InvalidRaster("dimensions overflow".to_string()))?;

        if samples.len() != expected {
            return Err(Error::InvalidRaster(format!(
                "{}x{} {:?} needs {} samples, got {}",
                width,
                height,
                mode,
                expected,
                samples.len()
            )));
        }

        Ok(Self {
            width,
            height,
            mode,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    pub fn has_alpha(&self) -> bool {
        self.mode.has_alpha()
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw samples, `width * height * channels` bytes
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// Samples of the pixel at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = self.channels();
        let start = (y as usize * self.width as usize + x as usize) * c;
        Some(&self.samples[start..start + c])
    }

    /// A raster of the same shape holding `samples`, which must have the
    /// same length as this raster's buffer
    pub(crate) fn with_samples(&self, samples: Vec<u8>) -> Raster {
        debug_assert_eq!(samples.len(), self.samples.len());
        Raster {
            width: self.width,
            height: self.height,
            mode: self.mode,
            samples,
        }
    }

    /// Iterator over pixels in raster scan order
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, u8> {
        self.samples.chunks_exact(self.channels())
    }

    /// Iterator over alpha samples, `None` for RGB rasters
    pub fn alpha_samples(&self) -> Option<impl Iterator<Item = u8> + '_> {
        if !self.has_alpha() {
            return None;
        }
        Some(self.samples.chunks_exact(4).map(|px| px[3]))
    }
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("mode", &self.mode)
            .field("samples", &self.samples.len())
            .finish()
    }
}

/// Decode PNG bytes into an RGB or RGBA raster
pub fn decode(bytes: &[u8]) -> Result<Raster> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    from_dynamic(img)
}

/// Normalise a decoded image into the raster model
fn from_dynamic(img: DynamicImage) -> Result<Raster> {
    let (width, height) = (img.width(), img.height());
    let color = img.color();
    debug!("Decoded {}x{} image as {:?}", width, height, color);

    match img {
        DynamicImage::ImageRgb8(buf) => Raster::new(width, height, ChannelMode::Rgb, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => {
            Raster::new(width, height, ChannelMode::Rgba, buf.into_raw())
        }
        img @ DynamicImage::ImageLuma8(_) => {
            Raster::new(width, height, ChannelMode::Rgb, img.to_rgb8().into_raw())
        }
        img @ DynamicImage::ImageLumaA8(_) => {
            Raster::new(width, height, ChannelMode::Rgba, img.to_rgba8().into_raw())
        }
        _ => Err(Error::UnsupportedFormat(format!(
            "{:?} is not an 8-bit layout",
            color
        ))),
    }
}

/// Encode a raster as an 8-bit PNG
pub fn encode(raster: &Raster) -> Result<Vec<u8>> {
    let color_type = match raster.mode() {
        ChannelMode::Rgb => ColorType::Rgb8,
        ChannelMode::Rgba => ColorType::Rgba8,
    };

    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(raster.samples(), raster.width(), raster.height(), color_type)
        .map_err(|e| Error::Encode(e.to_string()))?;

    Ok(bytes)
}

/// Read and decode a file
pub fn load<P: AsRef<Path>>(path: P) -> Result<Raster> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Encode and write a raster, replacing any existing file
pub fn save<P: AsRef<Path>>(raster: &Raster, path: P) -> Result<()> {
    let bytes = encode(raster)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
