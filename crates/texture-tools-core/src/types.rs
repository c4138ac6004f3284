use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// Representation of a texture file found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureFile {
    /// Full path to the texture file
    pub path: PathBuf,

    /// File size in bytes
    pub size: u64,
}

/// Channel layout of a decoded raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelMode {
    Rgb,
    Rgba,
}

impl ChannelMode {
    /// Number of 8-bit components per pixel
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba)
    }
}

/// Mirror axis for the orientation transformer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Reverse the order of rows (top becomes bottom)
    Vertical,

    /// Reverse the order of pixels within each row (left becomes right)
    Horizontal,
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v" | "vertical" => Ok(Self::Vertical),
            "h" | "horizontal" => Ok(Self::Horizontal),
            other => Err(Error::Configuration(format!("Unknown flip axis: {}", other))),
        }
    }
}

/// An opaque RGB colour used to fill transparent texels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FillColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl FillColor {
    pub const MAGENTA: FillColor = FillColor::new(255, 0, 255);
    pub const NEON_GREEN: FillColor = FillColor::new(0, 255, 0);
    pub const CYAN: FillColor = FillColor::new(0, 255, 255);
    pub const HOT_PINK: FillColor = FillColor::new(255, 105, 180);
    pub const BRIGHT_YELLOW: FillColor = FillColor::new(255, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for FillColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for FillColor {
    type Err = Error;

    /// Accepts one of the preset names or a `#rrggbb` hex value
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let preset = match lower.as_str() {
            "magenta" => Some(Self::MAGENTA),
            "green" | "neon-green" => Some(Self::NEON_GREEN),
            "cyan" => Some(Self::CYAN),
            "pink" | "hot-pink" => Some(Self::HOT_PINK),
            "yellow" | "bright-yellow" => Some(Self::BRIGHT_YELLOW),
            _ => None,
        };

        preset
            .or_else(|| Self::parse_hex(lower.trim_start_matches('#')))
            .ok_or_else(|| Error::Configuration(format!("Unknown fill colour: {}", s)))
    }
}

/// How transparency repair synthesises colour for fully transparent pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FillPolicy {
    /// Copy the colour of the nearest pixel with non-zero alpha
    EdgeExtend,

    /// Use one fixed colour everywhere
    Solid(FillColor),
}

/// What happens to the alpha of repaired pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillAlpha {
    /// Leave alpha at zero; only the hidden RGB changes
    #[default]
    Keep,

    /// Raise repaired pixels to alpha 255 so the fill becomes visible
    Opaque,
}

/// Whether RGB under alpha=0 takes part in the content fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransparentPixelPolicy {
    /// Hash samples exactly as decoded
    #[default]
    Verbatim,

    /// Replace every alpha=0 pixel with `[0, 0, 0, 0]` before hashing
    Normalize,
}

/// Types of actions that can be performed on files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    /// Move into another directory
    Move,

    /// Copy into another directory, overwriting any file of the same name
    Copy,

    /// Delete the file
    Delete,

    /// Decode, transform and write the file back in place
    Rewrite,
}

/// Result of a file action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// Type of action performed
    pub action_type: ActionType,

    /// File the action was applied to
    pub path: PathBuf,

    /// Destination for moves and copies
    pub target: Option<PathBuf>,

    /// Whether the action was successful
    pub success: bool,

    /// Optional error message if action failed
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok(action_type: ActionType, path: PathBuf, target: Option<PathBuf>) -> Self {
        Self {
            action_type,
            path,
            target,
            success: true,
            error: None,
        }
    }

    pub fn failed(
        action_type: ActionType,
        path: PathBuf,
        target: Option<PathBuf>,
        error: &Error,
    ) -> Self {
        Self {
            action_type,
            path,
            target,
            success: false,
            error: Some(error.to_string()),
        }
    }
}
