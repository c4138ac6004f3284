use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn, LevelFilter};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use texture_tools_core::batch::BatchReport;
use texture_tools_core::config::LogLevel;
use texture_tools_core::{
    folders, logging, ActionResult, AlphaFilter, Axis, Config, FillAlpha, FillColor, FillPolicy,
    RewriteOutcome, TextureTools, TransparentPixelPolicy,
};

#[derive(Parser)]
#[command(name = "texture-tools")]
#[command(about = "Inspect, repair and deduplicate game texture dumps")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args)]
struct GlobalArgs {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Run without making changes
    #[arg(long, global = true)]
    dry_run: bool,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write logs to rotating files in this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Worker threads (0 = one per CPU)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Hide the progress bar
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterKind {
    /// Any pixel below full opacity
    Any,
    /// More than two distinct alpha levels
    Variable,
    /// Any pixel whose alpha differs from --level
    Deviates,
}

#[derive(Subcommand)]
enum Commands {
    /// Find textures with identical pixels and remove all but one per group
    Dedup {
        /// Directories to scan
        #[arg(required = true)]
        directories: Vec<PathBuf>,

        /// Where to move duplicates (instead of deleting)
        #[arg(long)]
        duplicates_dir: Option<PathBuf>,

        /// Delete duplicates instead of moving them
        #[arg(long)]
        delete: bool,

        /// Ignore colour hidden under fully transparent pixels
        #[arg(long)]
        normalize_transparent: bool,

        /// Only report groups, touch nothing
        #[arg(long)]
        report_only: bool,
    },

    /// Move textures whose alpha matches a filter into another directory
    SortAlpha {
        #[arg(required = true)]
        directories: Vec<PathBuf>,

        /// Destination for matching textures
        #[arg(long)]
        dest: PathBuf,

        #[arg(long, value_enum, default_value = "any")]
        filter: FilterKind,

        /// Reference level for `--filter deviates`
        #[arg(long, default_value_t = 128)]
        level: u8,
    },

    /// List textures with more than two alpha levels
    DetectVariable {
        #[arg(required = true)]
        directories: Vec<PathBuf>,
    },

    /// Mirror textures in place
    Flip {
        #[arg(required = true)]
        directories: Vec<PathBuf>,

        /// v/vertical or h/horizontal
        #[arg(long)]
        axis: Option<Axis>,
    },

    /// Refill the colour under fully transparent pixels
    Fill {
        #[arg(required = true)]
        directories: Vec<PathBuf>,

        /// Solid colour (preset name or #rrggbb); edge-extend when omitted
        #[arg(long)]
        color: Option<FillColor>,

        /// Make filled pixels fully opaque
        #[arg(long)]
        opaque: bool,
    },

    /// Turn pixels of a solid fill colour back into transparency
    Unfill {
        #[arg(required = true)]
        directories: Vec<PathBuf>,

        #[arg(long, default_value = "magenta")]
        color: FillColor,
    },

    /// Rewrite alpha 128 to 255
    Solidify {
        #[arg(required = true)]
        directories: Vec<PathBuf>,
    },

    /// Rewrite alpha 255 to 128
    RestoreHalf {
        #[arg(required = true)]
        directories: Vec<PathBuf>,
    },

    /// Copy textures from SOURCE whose name is missing in DEST
    SyncNew { source: PathBuf, dest: PathBuf },

    /// Overwrite textures in DEST with same-named textures from SOURCE
    Replace { source: PathBuf, dest: PathBuf },

    /// Delete textures in DEST whose name also exists in SOURCE
    Prune { source: PathBuf, dest: PathBuf },

    /// Delete BKP_ backup textures
    RemoveBackups { directory: PathBuf },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "texture-tools.json")]
        path: PathBuf,
    },
}

fn main() -> Result<(), anyhow::Error> {
    // Parse command line arguments
    let cli = Cli::parse();

    if let Commands::GenerateConfig { path } = &cli.command {
        let config = Config::default();
        config.save_to_file(path)?;
        println!("Configuration file generated at: {}", path.display());
        return Ok(());
    }

    let mut config = load_config(&cli.global)?;
    init_logging(&cli.global, config.log_level)?;

    match cli.command {
        Commands::Dedup {
            directories,
            duplicates_dir,
            delete,
            normalize_transparent,
            report_only,
        } => {
            if let Some(dir) = duplicates_dir {
                config.duplicates_dir = dir;
            }
            config.delete_duplicates |= delete;
            if normalize_transparent {
                config.transparent_pixels = TransparentPixelPolicy::Normalize;
            }
            config.validate()?;

            let tools = start(config)?;
            let files = tools.discover(&directories)?;
            let report = tools.find_duplicates(&files)?;

            for group in &report.groups {
                println!("keep {}", group.canonical().display());
                for duplicate in group.duplicates() {
                    println!("  dup {}", duplicate.display());
                }
            }
            println!(
                "{} groups, {} duplicates, {} unique, {} unreadable",
                report.groups.len(),
                report.duplicate_count(),
                report.unique,
                report.failures.len()
            );

            if !report_only {
                summarize_actions("dedup", &tools.remove_duplicates(&report));
            }
        }

        Commands::SortAlpha {
            directories,
            dest,
            filter,
            level,
        } => {
            let filter = match filter {
                FilterKind::Any => AlphaFilter::AnyTransparency,
                FilterKind::Variable => AlphaFilter::Variable,
                FilterKind::Deviates => AlphaFilter::DeviatesFrom(level),
            };
            let tools = start(config)?;
            let files = tools.discover(&directories)?;
            let report = tools.sort_by_alpha(&files, filter, &dest)?;

            summarize_actions("sort-alpha", &report.actions);
            println!(
                "{} without alpha, {} unreadable, {} not processed",
                report.no_alpha.len(),
                report.failures.len(),
                report.cancelled.len()
            );
        }

        Commands::DetectVariable { directories } => {
            let tools = start(config)?;
            let files = tools.discover(&directories)?;
            let report = tools.filter_files(&files, AlphaFilter::Variable)?;

            let mut variable = 0;
            for (path, matched) in &report.results {
                if *matched == Some(true) {
                    variable += 1;
                    println!("{}", path.display());
                }
            }
            println!(
                "{} of {} textures have variable alpha",
                variable,
                report.total()
            );
        }

        Commands::Flip { directories, axis } => {
            let axis = axis.unwrap_or(config.flip_axis);
            let tools = start(config)?;
            let files = tools.discover(&directories)?;
            summarize_rewrites("flip", &tools.flip_files(&files, axis)?);
        }

        Commands::Fill {
            directories,
            color,
            opaque,
        } => {
            if let Some(color) = color {
                config.fill_policy = FillPolicy::Solid(color);
            }
            if opaque {
                config.fill_alpha = FillAlpha::Opaque;
            }
            let tools = start(config)?;
            let files = tools.discover(&directories)?;
            summarize_rewrites("fill", &tools.repair_files(&files)?);
        }

        Commands::Unfill { directories, color } => {
            let tools = start(config)?;
            let files = tools.discover(&directories)?;
            summarize_rewrites("unfill", &tools.restore_files(&files, color)?);
        }

        Commands::Solidify { directories } => {
            let tools = start(config)?;
            let files = tools.discover(&directories)?;
            summarize_rewrites("solidify", &tools.remap_alpha_files(&files, 128, 255)?);
        }

        Commands::RestoreHalf { directories } => {
            let tools = start(config)?;
            let files = tools.discover(&directories)?;
            summarize_rewrites("restore-half", &tools.remap_alpha_files(&files, 255, 128)?);
        }

        Commands::SyncNew { source, dest } => {
            summarize_actions(
                "sync-new",
                &folders::copy_new_files(&source, &dest, config.dry_run)?,
            );
        }

        Commands::Replace { source, dest } => {
            summarize_actions(
                "replace",
                &folders::replace_matching_files(&source, &dest, config.dry_run)?,
            );
        }

        Commands::Prune { source, dest } => {
            summarize_actions(
                "prune",
                &folders::remove_name_duplicates(&source, &dest, config.dry_run)?,
            );
        }

        Commands::RemoveBackups { directory } => {
            summarize_actions(
                "remove-backups",
                &folders::remove_backup_files(&directory, config.dry_run)?,
            );
        }

        Commands::GenerateConfig { .. } => {}
    }

    Ok(())
}

/// Config file (or defaults) with global flags applied on top
fn load_config(args: &GlobalArgs) -> Result<Config, anyhow::Error> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    config.dry_run |= args.dry_run;
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if args.no_progress {
        config.show_progress = false;
    }

    // Set log level based on verbosity
    config.log_level = match args.verbose {
        0 => config.log_level,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };

    config.validate()?;
    Ok(config)
}

fn init_logging(args: &GlobalArgs, level: LogLevel) -> Result<(), anyhow::Error> {
    let level = LevelFilter::from(level);
    match &args.log_dir {
        Some(dir) => logging::init_logger(dir, level)
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?,
        None => {
            env_logger::Builder::new()
                .filter_level(level)
                .parse_env(logging::LOG_ENV_VAR)
                .init();
        }
    }
    Ok(())
}

/// Build the tool set and route Ctrl-C to its shutdown flag
fn start(config: Config) -> Result<TextureTools, anyhow::Error> {
    if config.dry_run {
        info!("Dry run: no files will be changed");
    }

    let tools = TextureTools::new(config);
    let shutdown = tools.shutdown_handle();
    ctrlc::set_handler(move || {
        warn!("Interrupt received, finishing current files");
        shutdown.store(true, Ordering::SeqCst);
    })?;
    Ok(tools)
}

fn summarize_actions(label: &str, results: &[ActionResult]) {
    let failed: Vec<&ActionResult> = results.iter().filter(|r| !r.success).collect();
    for result in &failed {
        eprintln!(
            "{}: {} failed: {}",
            label,
            result.path.display(),
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!(
        "{}: {} succeeded, {} failed",
        label,
        results.len() - failed.len(),
        failed.len()
    );
}

fn summarize_rewrites(label: &str, report: &BatchReport<RewriteOutcome>) {
    let count = |outcome: RewriteOutcome| {
        report
            .results
            .iter()
            .filter(|(_, o)| *o == outcome)
            .count()
    };

    for failure in &report.failures {
        eprintln!("{}: {} failed: {}", label, failure.path.display(), failure.error);
    }
    println!(
        "{}: {} written, {} would be written, {} unchanged, {} without alpha, {} without opaque pixels, {} failed, {} not processed",
        label,
        count(RewriteOutcome::Written),
        count(RewriteOutcome::DryRun),
        count(RewriteOutcome::Unchanged),
        count(RewriteOutcome::NoAlphaChannel),
        count(RewriteOutcome::NoOpaquePixels),
        report.failures.len(),
        report.cancelled.len()
    );
}
