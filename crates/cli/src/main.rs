//! codemap CLI
//!
//! Writes heuristic structure maps next to source files and rolls them up
//! into per-directory summaries.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codemap_core::{
    deep_clean, fsutil, resolve_target, Config, MapScanner, ScanReport, CONFIG_FILE, DEFAULT_JOBS,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Heuristic structure maps for source trees
#[derive(Parser)]
#[command(name = "codemap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Heuristic structure maps for source trees, readable by humans and LLMs")]
#[command(long_about = r#"
codemap: Heuristic Structure Maps

Writes a <file>.map.txt sidecar next to every watched source file listing the
line ranges of its functions, types, blocks, tests, markup elements, style
rules, headings and manual markers. Every directory under the configured roots
gets four rollups:

  _level_0.map.txt  inventory of immediate files
  _level_1.map.txt  region tables of watched files
  _level_2.map.txt  subdirectory tree
  _level_3.map.txt  full tree with inlined region tables

Roots, allowed extensions and extra ignore names are read from codemap.json.
When no usable configuration exists one is generated from the extensions found
in the working directory.

Examples:
  codemap scan                    # Map the current directory
  codemap scan src                # Map one subtree
  codemap scan --full             # Deep clean every root, then remap
  codemap scan --ext go           # Remap only .go files
  codemap clean                   # Remove every map artifact
  codemap prune                   # Remove maps of deleted or excluded files
"#)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Number of directories rolled up at once
    #[arg(short, long, global = true, default_value_t = DEFAULT_JOBS)]
    pub jobs: usize,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Map source files and write directory rollups
    Scan {
        /// Directory to scan (default: current directory)
        path: Option<PathBuf>,

        /// Deep clean every configured root, then remap everything
        #[arg(long, conflicts_with = "path")]
        full: bool,

        /// Map only files with this extension under every root
        #[arg(long, conflicts_with_all = ["path", "full"])]
        ext: Option<String>,
    },

    /// Remove every map artifact below a directory
    Clean {
        /// Directory to clean
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Remove maps whose source is gone, ignored or no longer allowed
    Prune,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match &args.command {
        Commands::Scan { path, full, ext } => {
            run_scan(path.as_deref(), *full, ext.as_deref(), &args)
        }
        Commands::Clean { path } => run_clean(path),
        Commands::Prune => run_prune(&args),
    }
}

/// Log to stderr; `RUST_LOG` wins unless `--verbose` is given
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_scanner(args: &Args) -> Result<MapScanner> {
    let config = Config::load_or_setup(&args.config);
    let scanner = MapScanner::new(config)
        .context("Failed to create scanner")?
        .with_jobs(args.jobs);
    Ok(scanner)
}

fn run_scan(path: Option<&Path>, full: bool, ext: Option<&str>, args: &Args) -> Result<()> {
    // A bad target aborts before the config is loaded or generated
    let target = match (ext, full) {
        (None, false) => Some(resolve_target(path.unwrap_or(Path::new(".")))?),
        _ => None,
    };
    let scanner = build_scanner(args)?;

    let spinner = spinner(args.verbose, "Mapping files...");
    let result = match (ext, target) {
        (Some(ext), _) => scanner.scan_extension(ext),
        (None, Some(target)) => scanner.scan(&target),
        (None, None) => scanner.scan_full(),
    };
    if let Some(ref pb) = spinner {
        pb.finish_and_clear();
    }

    let report = result.context("Scan failed")?;
    print_report(&report);
    Ok(())
}

fn run_clean(path: &Path) -> Result<()> {
    let target = fsutil::absolute_clean(path)
        .with_context(|| format!("Invalid directory: {}", path.display()))?;
    if !target.is_dir() {
        anyhow::bail!("Directory does not exist: {}", target.display());
    }

    let removed = deep_clean(&target);
    println!(
        "{} Workspace cleaned, removed {} map files",
        "✓".green().bold(),
        removed
    );
    Ok(())
}

fn run_prune(args: &Args) -> Result<()> {
    let scanner = build_scanner(args)?;
    let removed = scanner.prune().context("Failed to prune maps")?;
    println!("{} Removed {} obsolete map files", "✓".green().bold(), removed);
    Ok(())
}

/// Spinner on an interactive stderr, hidden when debug logs are streaming
fn spinner(verbose: bool, message: &'static str) -> Option<ProgressBar> {
    if verbose || !atty::is(atty::Stream::Stderr) {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    Some(pb)
}

fn print_report(report: &ScanReport) {
    println!(
        "{} Mapped {} files, {} directories in {}ms",
        "✓".green().bold(),
        report.files_mapped,
        report.directories,
        report.duration_ms
    );
    if report.files_failed > 0 {
        println!(
            "{} {} files could not be mapped (see log)",
            "!".yellow().bold(),
            report.files_failed
        );
    }
    println!("Check the {} files!", "_level_*.map.txt".cyan());
}
