//! Parallel per-file processing.
//!
//! Each file is handled independently on a rayon pool; results are gathered
//! in input order and reduced on the calling thread, so nothing shared is
//! mutated from workers except progress and the cancellation flag.

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::log_file_error;
use crate::types::TextureFile;

/// A file that could not be processed
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: Error,
}

/// Per-file results of one batch
#[derive(Debug)]
pub struct BatchReport<T> {
    /// Successful results in input order
    pub results: Vec<(PathBuf, T)>,

    /// Files that failed; the batch carried on without them
    pub failures: Vec<FileFailure>,

    /// Files never started because the batch was cancelled
    pub cancelled: Vec<PathBuf>,
}

impl<T> BatchReport<T> {
    pub fn interrupted(&self) -> bool {
        !self.cancelled.is_empty()
    }

    pub fn total(&self) -> usize {
        self.results.len() + self.failures.len() + self.cancelled.len()
    }
}

enum Outcome<T> {
    Done(T),
    Failed(Error),
    Cancelled,
}

/// Run `task` over every file on a dedicated pool.
///
/// `shutdown` is checked before each file; once set, remaining files are
/// reported as cancelled rather than processed.
pub fn run_batch<T, F>(
    files: &[TextureFile],
    config: &Config,
    shutdown: &AtomicBool,
    label: &str,
    task: F,
) -> Result<BatchReport<T>>
where
    T: Send,
    F: Fn(&Path) -> Result<T> + Sync,
{
    let start = Instant::now();
    let threads = config.worker_threads();
    info!("{}: {} files on {} threads", label, files.len(), threads);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| Error::Configuration(format!("Failed to build thread pool: {}", e)))?;

    let progress = progress_bar(files.len(), config.show_progress);
    progress.set_message(label.to_string());

    let outcomes: Vec<Outcome<T>> = pool.install(|| {
        files
            .par_iter()
            .map(|file| {
                if shutdown.load(Ordering::Relaxed) {
                    return Outcome::Cancelled;
                }
                let outcome = match task(&file.path) {
                    Ok(value) => Outcome::Done(value),
                    Err(e) => Outcome::Failed(e),
                };
                progress.inc(1);
                outcome
            })
            .collect()
    });

    let mut report = BatchReport {
        results: Vec::with_capacity(files.len()),
        failures: Vec::new(),
        cancelled: Vec::new(),
    };

    for (file, outcome) in files.iter().zip(outcomes) {
        match outcome {
            Outcome::Done(value) => report.results.push((file.path.clone(), value)),
            Outcome::Failed(error) => {
                log_file_error(&file.path, label, &error);
                report.failures.push(FileFailure {
                    path: file.path.clone(),
                    error,
                });
            }
            Outcome::Cancelled => report.cancelled.push(file.path.clone()),
        }
    }

    let elapsed = start.elapsed();
    progress.finish_with_message(format!(
        "{}: {} ok, {} failed in {:.2?}",
        label,
        report.results.len(),
        report.failures.len(),
        elapsed
    ));

    if report.interrupted() {
        info!(
            "{} interrupted, {} files not processed",
            label,
            report.cancelled.len()
        );
    }
    debug!("{} finished in {:.2?}", label, elapsed);

    Ok(report)
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{eta}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<TextureFile> {
        names
            .iter()
            .map(|n| TextureFile {
                path: PathBuf::from(n),
                size: 0,
            })
            .collect()
    }

    fn quiet_config() -> Config {
        Config {
            show_progress: false,
            threads: 2,
            ..Config::default()
        }
    }

    #[test]
    fn test_results_keep_input_order_and_failures_continue() {
        let input = files(&["a.png", "bad.png", "c.png"]);
        let shutdown = AtomicBool::new(false);

        let report = run_batch(&input, &quiet_config(), &shutdown, "test", |path| {
            if path == Path::new("bad.png") {
                Err(Error::Decode("broken".to_string()))
            } else {
                Ok(path.to_string_lossy().len())
            }
        })
        .unwrap();

        let done: Vec<_> = report.results.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(done, vec![PathBuf::from("a.png"), PathBuf::from("c.png")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, PathBuf::from("bad.png"));
        assert!(!report.interrupted());
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_shutdown_cancels_remaining_files() {
        let input = files(&["a.png", "b.png"]);
        let shutdown = AtomicBool::new(true);

        let report = run_batch(&input, &quiet_config(), &shutdown, "test", |_| Ok(())).unwrap();

        assert!(report.results.is_empty());
        assert_eq!(report.cancelled.len(), 2);
        assert!(report.interrupted());
    }
}
