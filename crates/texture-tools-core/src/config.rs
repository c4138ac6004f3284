use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{Axis, FillAlpha, FillPolicy, TransparentPixelPolicy};

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Configuration for texture processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether to run without making changes
    pub dry_run: bool,

    /// Where duplicate textures are moved instead of being deleted
    pub duplicates_dir: PathBuf,

    /// Whether to delete duplicates instead of moving them
    pub delete_duplicates: bool,

    /// Whether RGB under fully transparent pixels counts toward duplicate detection
    pub transparent_pixels: TransparentPixelPolicy,

    /// How transparent pixels are filled by the repair tool
    pub fill_policy: FillPolicy,

    /// Alpha given to repaired pixels
    pub fill_alpha: FillAlpha,

    /// Default axis for the flip tool
    pub flip_axis: Axis,

    /// Maximum directory depth for scanning
    pub max_depth: Option<usize>,

    /// Number of threads to use for processing (0 = auto)
    pub threads: usize,

    /// Whether to draw a progress bar during batch work
    pub show_progress: bool,

    /// Log level
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dry_run: false,
            duplicates_dir: PathBuf::from("duplicates"),
            delete_duplicates: false,
            transparent_pixels: TransparentPixelPolicy::Verbatim,
            fill_policy: FillPolicy::EdgeExtend,
            fill_alpha: FillAlpha::Keep,
            flip_axis: Axis::Vertical,
            max_depth: None,
            threads: 0, // Auto
            show_progress: true,
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Moving duplicates needs somewhere to move them
        if !self.delete_duplicates && self.duplicates_dir.as_os_str().is_empty() {
            return Err(Error::Configuration(
                "A duplicates directory is required unless duplicates are deleted".to_string(),
            ));
        }

        if self.max_depth == Some(0) {
            return Err(Error::Configuration(
                "Maximum scan depth must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Number of worker threads after resolving 0 to the CPU count
    pub fn worker_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}
