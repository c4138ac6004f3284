//! Fixture textures written as real PNGs at test time.
#![allow(dead_code)]

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs::File;
use std::path::{Path, PathBuf};
use texture_tools_core::{Config, TextureTools};

/// Config for tests: no progress bar, small pool
pub fn quiet_config() -> Config {
    Config {
        show_progress: false,
        threads: 2,
        ..Config::default()
    }
}

pub fn quiet_tools(config: Config) -> TextureTools {
    TextureTools::new(Config {
        show_progress: false,
        threads: 2,
        ..config
    })
}

/// 8x8 RGBA gradient whose left half is fully transparent.
/// `seed` shifts the colours so different seeds give different content.
pub fn half_transparent(seed: u8) -> RgbaImage {
    RgbaImage::from_fn(8, 8, |x, y| {
        let alpha = if x < 4 { 0 } else { 255 };
        Rgba([
            (x as u8 * 30).wrapping_add(seed),
            (y as u8 * 30).wrapping_add(seed),
            seed,
            alpha,
        ])
    })
}

/// 4x4 RGBA texture with alpha levels {0, 128, 255}
pub fn variable_alpha() -> RgbaImage {
    RgbaImage::from_fn(4, 4, |x, _| {
        let alpha = [0, 128, 255, 255][x as usize];
        Rgba([200, 100, 50, alpha])
    })
}

/// 4x4 fully opaque RGBA texture
pub fn opaque(seed: u8) -> RgbaImage {
    RgbaImage::from_fn(4, 4, |x, y| Rgba([seed, x as u8, y as u8, 255]))
}

/// 4x4 RGB texture
pub fn rgb(seed: u8) -> RgbImage {
    RgbImage::from_fn(4, 4, |x, y| Rgb([seed, x as u8 * 10, y as u8 * 10]))
}

pub fn write_rgba(dir: &Path, name: &str, image: &RgbaImage) -> PathBuf {
    let path = dir.join(name);
    image.save(&path).unwrap();
    path
}

pub fn write_rgb(dir: &Path, name: &str, image: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    image.save(&path).unwrap();
    path
}

/// Same pixels as [`write_rgba`] but a different compression level and filter,
/// so the file bytes differ
pub fn write_rgba_reencoded(dir: &Path, name: &str, image: &RgbaImage) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    PngEncoder::new_with_quality(file, CompressionType::Best, FilterType::Paeth)
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
        .unwrap();
    path
}

pub fn read_rgba(path: &Path) -> RgbaImage {
    image::open(path).unwrap().to_rgba8()
}
