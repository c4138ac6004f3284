//! Core functionality for inspecting and cleaning up game texture dumps.
//!
//! This library provides:
//! - PNG decoding into an explicit RGB/RGBA raster model
//! - Alpha profiling and transparency repair
//! - Content fingerprints and duplicate grouping
//! - Batch tools that apply all of the above to directories on disk

// -- External Dependencies --
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::*;
pub use error::{Error, Result};
pub use types::*;

// -- Public Modules --
pub mod actions;
pub mod alpha;
pub mod batch;
pub mod config;
pub mod deduplication;
pub mod discovery;
pub mod fingerprint;
pub mod folders;
pub mod logging;
pub mod raster;
pub mod repair;
pub mod transform;
pub mod types;

use alpha::{AlphaClass, AlphaProfile};
use batch::{run_batch, BatchReport, FileFailure};
use deduplication::DuplicateGroup;
use raster::Raster;
use repair::RepairWarning;

/// Which alpha profiles `sort_by_alpha` picks out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaFilter {
    /// At least one pixel below 255
    AnyTransparency,

    /// More than two distinct alpha levels
    Variable,

    /// At least one pixel whose alpha differs from the given level
    DeviatesFrom(u8),
}

impl AlphaFilter {
    pub fn matches(&self, profile: &AlphaProfile) -> bool {
        match self {
            AlphaFilter::AnyTransparency => profile.has_transparency(),
            AlphaFilter::Variable => profile.class() == AlphaClass::Variable,
            AlphaFilter::DeviatesFrom(level) => profile.deviates_from(*level),
        }
    }

    /// Test a raster directly. `Variable` stops at the third alpha level
    /// instead of building a full profile.
    pub fn check(&self, raster: &Raster) -> Result<bool> {
        match self {
            AlphaFilter::Variable => {
                Ok(alpha::classify_alpha(raster)? == AlphaClass::Variable)
            }
            _ => Ok(self.matches(&alpha::profile_alpha(raster)?)),
        }
    }
}

/// Result of a duplicate scan
#[derive(Debug)]
pub struct DedupReport {
    /// Groups with more than one member
    pub groups: Vec<DuplicateGroup<PathBuf>>,

    /// Files whose content matched no other file
    pub unique: usize,

    /// Files that could not be decoded
    pub failures: Vec<FileFailure>,
}

impl DedupReport {
    /// Number of files that would be removed
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|g| g.len() - 1).sum()
    }
}

/// Result of sorting files by their alpha profile
#[derive(Debug, Default)]
pub struct AlphaSortReport {
    /// One move per matching file
    pub actions: Vec<ActionResult>,

    /// RGB files, which have no alpha to inspect
    pub no_alpha: Vec<PathBuf>,

    pub failures: Vec<FileFailure>,

    /// Files never inspected because of a shutdown request
    pub cancelled: Vec<PathBuf>,
}

/// What happened to one file in a rewrite batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// The file was re-encoded with new pixels
    Written,

    /// The new pixels would have been written, but this is a dry run
    DryRun,

    /// The operation produced identical pixels; the file was left alone
    Unchanged,

    /// The file is RGB and the operation needs alpha
    NoAlphaChannel,

    /// Edge-extend had nothing visible to copy from
    NoOpaquePixels,
}

enum Edit {
    Replace(Raster),
    Skip(RewriteOutcome),
}

/// Main entry point for batch texture work
pub struct TextureTools {
    config: Config,
    shutdown_requested: Arc<AtomicBool>,
}

impl TextureTools {
    /// Create a new TextureTools with the provided configuration
    pub fn new(config: Config) -> Self {
        Self {
            config,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Flag that stops batches before their next file once set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown_requested)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Relaxed)
    }

    /// Discover all PNG textures in the provided directories
    pub fn discover<P: AsRef<Path> + Sync>(&self, directories: &[P]) -> Result<Vec<TextureFile>> {
        info!("Discovering textures...");
        let files = discovery::discover_textures(directories, &self.config)?;
        info!("Found {} textures", files.len());
        Ok(files)
    }

    /// Fingerprint every file and group identical content.
    ///
    /// Returns [`Error::Interrupted`] if a shutdown is requested mid-scan: a
    /// partial grouping could mark a file unique only because its twin was
    /// never read.
    pub fn find_duplicates(&self, files: &[TextureFile]) -> Result<DedupReport> {
        let policy = self.config.transparent_pixels;
        let report = run_batch(
            files,
            &self.config,
            &self.shutdown_requested,
            "fingerprint",
            |path| {
                let raster = raster::load(path)?;
                Ok(fingerprint::fingerprint(&raster, policy))
            },
        )?;

        if report.interrupted() {
            return Err(Error::Interrupted);
        }

        let all_groups = deduplication::group_duplicates(report.results);
        let (groups, singles): (Vec<_>, Vec<_>) =
            all_groups.into_iter().partition(|g| g.is_duplicate());

        info!(
            "Found {} duplicate groups, {} unique files, {} unreadable",
            groups.len(),
            singles.len(),
            report.failures.len()
        );
        for group in &groups {
            debug!(
                "Group {} keeps {} ({} members)",
                group.fingerprint,
                group.canonical().display(),
                group.len()
            );
        }

        Ok(DedupReport {
            groups,
            unique: singles.len(),
            failures: report.failures,
        })
    }

    /// Move every non-canonical member into `duplicates_dir`, or delete it
    /// when `delete_duplicates` is set
    pub fn remove_duplicates(&self, report: &DedupReport) -> Vec<ActionResult> {
        let dry_run = self.config.dry_run;
        let mut results = Vec::with_capacity(report.duplicate_count());
        let mut claimed = HashSet::new();

        for group in &report.groups {
            if self.shutdown_requested() {
                warn!("Shutdown requested, leaving remaining duplicates in place");
                break;
            }
            for duplicate in group.duplicates() {
                let result = if self.config.delete_duplicates {
                    actions::delete(duplicate, dry_run)
                } else {
                    actions::move_into(
                        duplicate,
                        &self.config.duplicates_dir,
                        dry_run,
                        &mut claimed,
                    )
                };
                results.push(result);
            }
        }

        results
    }

    /// Whether each file matches `filter`; `None` for RGB files
    pub fn filter_files(
        &self,
        files: &[TextureFile],
        filter: AlphaFilter,
    ) -> Result<BatchReport<Option<bool>>> {
        run_batch(
            files,
            &self.config,
            &self.shutdown_requested,
            "alpha filter",
            |path| match filter.check(&raster::load(path)?) {
                Ok(matched) => Ok(Some(matched)),
                Err(Error::NoAlphaChannel) => Ok(None),
                Err(e) => Err(e),
            },
        )
    }

    /// Move files whose alpha matches `filter` into `dest`
    pub fn sort_by_alpha(
        &self,
        files: &[TextureFile],
        filter: AlphaFilter,
        dest: &Path,
    ) -> Result<AlphaSortReport> {
        let checked = self.filter_files(files, filter)?;
        let mut report = AlphaSortReport {
            failures: checked.failures,
            cancelled: checked.cancelled,
            ..AlphaSortReport::default()
        };
        let mut claimed = HashSet::new();

        for (path, matched) in checked.results {
            match matched {
                Some(true) => {
                    report.actions.push(actions::move_into(
                        &path,
                        dest,
                        self.config.dry_run,
                        &mut claimed,
                    ));
                }
                Some(false) => {}
                None => {
                    debug!("Skipping {}: no alpha channel", path.display());
                    report.no_alpha.push(path);
                }
            }
        }

        info!(
            "{} of {} files matched {:?}",
            report.actions.len(),
            files.len(),
            filter
        );
        Ok(report)
    }

    /// Mirror every file along `axis`
    pub fn flip_files(
        &self,
        files: &[TextureFile],
        axis: Axis,
    ) -> Result<BatchReport<RewriteOutcome>> {
        self.rewrite_files(files, "flip", |raster| {
            Ok(Edit::Replace(transform::flip(raster, axis)))
        })
    }

    /// Refill transparent pixels using the configured fill policy
    pub fn repair_files(&self, files: &[TextureFile]) -> Result<BatchReport<RewriteOutcome>> {
        let policy = self.config.fill_policy;
        let fill_alpha = self.config.fill_alpha;
        self.rewrite_files(files, "repair", |raster| {
            let repaired = repair::repair_transparency(raster, &policy, fill_alpha)?;
            match repaired.warning {
                Some(RepairWarning::NoOpaquePixels) => {
                    Ok(Edit::Skip(RewriteOutcome::NoOpaquePixels))
                }
                None => Ok(Edit::Replace(repaired.raster)),
            }
        })
    }

    /// Undo a solid fill of `color`
    pub fn restore_files(
        &self,
        files: &[TextureFile],
        color: FillColor,
    ) -> Result<BatchReport<RewriteOutcome>> {
        self.rewrite_files(files, "restore", |raster| {
            Ok(Edit::Replace(repair::restore_transparency(raster, color)?))
        })
    }

    /// Rewrite alpha `from` to `to` in every file
    pub fn remap_alpha_files(
        &self,
        files: &[TextureFile],
        from: u8,
        to: u8,
    ) -> Result<BatchReport<RewriteOutcome>> {
        self.rewrite_files(files, "remap alpha", |raster| {
            Ok(Edit::Replace(transform::remap_alpha(raster, from, to)?))
        })
    }

    /// Decode, edit and write back each file. Files needing alpha that have
    /// none are reported, not failed.
    fn rewrite_files<F>(
        &self,
        files: &[TextureFile],
        label: &str,
        edit: F,
    ) -> Result<BatchReport<RewriteOutcome>>
    where
        F: Fn(&Raster) -> Result<Edit> + Sync,
    {
        let dry_run = self.config.dry_run;
        let report = run_batch(files, &self.config, &self.shutdown_requested, label, |path| {
            let original = raster::load(path)?;
            let edited = match edit(&original) {
                Ok(Edit::Replace(raster)) => raster,
                Ok(Edit::Skip(outcome)) => {
                    warn!("{}: skipping {} ({:?})", label, path.display(), outcome);
                    return Ok(outcome);
                }
                Err(Error::NoAlphaChannel) => {
                    info!("{}: skipping {}, no alpha channel", label, path.display());
                    return Ok(RewriteOutcome::NoAlphaChannel);
                }
                Err(e) => return Err(e),
            };

            if edited == original {
                return Ok(RewriteOutcome::Unchanged);
            }

            actions::rewrite(path, &edited, dry_run)?;
            Ok(if dry_run {
                RewriteOutcome::DryRun
            } else {
                RewriteOutcome::Written
            })
        })?;

        let written = report
            .results
            .iter()
            .filter(|(_, outcome)| *outcome == RewriteOutcome::Written)
            .count();
        info!("{}: rewrote {} of {} files", label, written, files.len());
        Ok(report)
    }
}
