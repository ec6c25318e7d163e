// mediacheck CLI binary

use std::path::PathBuf;
use clap::{Parser, Subcommand};
use anyhow::{Context, Result};

use mediacheck::config::PolicyConfig;
use mediacheck::db::default_db_path;
use mediacheck::tools;

#[derive(Parser)]
#[command(name = "mediacheck")]
#[command(about = "Checks photo/video timestamps, GPS and timezone tags against a cached exiftool snapshot", long_about = None)]
#[command(version)]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every cached file and optionally offer fixes
    Check {
        /// Path to the exif cache database [default: ./exifs.sqlite]
        #[arg(long)]
        db: Option<PathBuf>,
        /// Only process media whose path matches this regex
        #[arg(long)]
        regex: Option<String>,
        /// Offer to fix tags
        #[arg(long)]
        fix: bool,
        /// Apply every suggested fix without asking
        #[arg(long, requires = "fix")]
        yes: bool,
        /// Print a summary of errors per directory
        #[arg(long)]
        dir_summary: bool,
        /// Policy file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Re-extract metadata for new and modified files into the cache
    Refresh {
        /// Collection root
        #[arg(long)]
        root: PathBuf,
        /// Path to the exif cache database [default: ./exifs.sqlite]
        #[arg(long)]
        db: Option<PathBuf>,
        /// Write without asking for confirmation
        #[arg(long)]
        yes: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check { db, regex, fix, yes, dir_summary, config } => {
            cmd_check(db, regex, fix, yes, dir_summary, config)
        }
        Commands::Refresh { root, db, yes } => cmd_refresh(root, db, yes),
    }
}

fn cmd_check(
    db: Option<PathBuf>,
    regex: Option<String>,
    fix: bool,
    yes: bool,
    dir_summary: bool,
    config: Option<PathBuf>,
) -> Result<()> {
    let db_path = db.unwrap_or_else(default_db_path);

    let policy = match &config {
        Some(path) => PolicyConfig::load(path)
            .with_context(|| format!("loading policy {}", path.display()))?,
        None => PolicyConfig::default(),
    };

    if fix && !tools::is_exiftool_available() {
        log::warn!("exiftool not found, applying fixes will fail (set {})", tools::EXIFTOOL_ENV);
    }

    let report = mediacheck::check_all(&db_path, regex.as_deref(), fix, dir_summary, yes, &policy)?;

    if report.aborted {
        println!("Aborted: {} of {} fixes applied", report.applied, report.pending_fixes);
    } else if fix {
        println!("Applied {} of {} fixes", report.applied, report.pending_fixes);
    }

    Ok(())
}

fn cmd_refresh(root: PathBuf, db: Option<PathBuf>, yes: bool) -> Result<()> {
    let db_path = db.unwrap_or_else(default_db_path);

    if !root.is_dir() {
        anyhow::bail!("Collection root not found: {}", root.display());
    }
    if !tools::is_exiftool_available() {
        anyhow::bail!("exiftool not found (set {} to override)", tools::EXIFTOOL_ENV);
    }

    let summary = mediacheck::refresh(&db_path, &root, yes)?;

    println!("Refreshed {}", db_path.display());
    println!("  Discovered: {}", summary.discovered);
    println!("  Inserted: {}", summary.inserted);
    println!("  Updated: {}", summary.updated);

    Ok(())
}
