use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the texture-tools library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed, truncated or otherwise undecodable image bytes
    #[error("Decode error: {0}")]
    Decode(String),

    /// Failure writing a raster back to PNG
    #[error("Encode error: {0}")]
    Encode(String),

    /// Bit depth or pixel layout the raster model cannot hold
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An alpha-dependent operation was requested on an RGB raster
    #[error("Image has no alpha channel")]
    NoAlphaChannel,

    /// Raster dimensions and sample buffer disagree
    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    /// File not found error
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The batch was cancelled before every file was processed
    #[error("Operation interrupted")]
    Interrupted,
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(e) => Error::UnsupportedFormat(e.to_string()),
            other => Error::Decode(other.to_string()),
        }
    }
}
