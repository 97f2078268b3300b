//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! CLI supporting `create`, `stat`, and `get`.
//!
//! Examples:
//! ```bash
//! lmdb-dataset create --input-path data/ --gt-file data/gt.txt --output-path lmdb/train
//! lmdb-dataset create --input-path data/ --gt-file data/gt.txt --output-path lmdb/train --no-check-valid --map-size 8G
//! lmdb-dataset stat   lmdb/train
//! lmdb-dataset get    lmdb/train 42 --image-out sample42.png
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lmdb_dataset::{create_dataset, parse_size, DatasetConfig, DatasetReader};

/// Macro to safely print with broken pipe handling
macro_rules! safe_println {
    ($($arg:tt)*) => {
        match writeln!(io::stdout(), $($arg)*) {
            Ok(_) => {},
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                // Gracefully exit on broken pipe (e.g., when piped to head/tail)
                std::process::exit(0);
            }
            Err(e) => return Err(e.into())
        }
    };
}

// -- Commands

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short = 'v',
        long,
        action = ArgAction::Count,
        help = "Increase log verbosity: -v = Debug, -vv = Trace",
    )]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build an LMDB dataset from a folder of images and a ground-truth file.
    Create {
        /// Root directory that image paths in the ground-truth file are relative to
        #[arg(long = "input-path")]
        input_path: PathBuf,

        /// Ground-truth file: image path and label on alternating lines
        #[arg(long = "gt-file")]
        gt_file: PathBuf,

        /// Output directory for the LMDB files (created if absent)
        #[arg(long = "output-path")]
        output_path: PathBuf,

        /// Store every readable file without decoding it first
        #[arg(long = "no-check-valid")]
        no_check_valid: bool,

        /// LMDB map size, bytes or with a K/M/G/T suffix (default 1G)
        #[arg(long = "map-size", value_parser = parse_size)]
        map_size: Option<usize>,

        /// Samples per write transaction (default 1000)
        #[arg(long = "batch-size")]
        batch_size: Option<usize>,
    },

    /// Show the number of samples in a dataset.
    Stat {
        /// Dataset directory
        dataset: PathBuf,
    },

    /// Print the label of one sample (1-based index), optionally saving its image.
    Get {
        /// Dataset directory
        dataset: PathBuf,

        /// Sample index, starting at 1
        index: u64,

        /// Write the raw image bytes to this file
        #[arg(long = "image-out")]
        image_out: Option<PathBuf>,
    },
}

// -----------------------------------------------------------------------------
// Command implementations
// -----------------------------------------------------------------------------

fn create_cmd(
    input_path: PathBuf,
    gt_file: PathBuf,
    output_path: PathBuf,
    no_check_valid: bool,
    map_size: Option<usize>,
    batch_size: Option<usize>,
) -> Result<()> {
    let mut config = DatasetConfig::new(input_path, gt_file, output_path).apply_env_overrides();
    if no_check_valid {
        config = config.with_check_valid(false);
    }
    if let Some(size) = map_size {
        config = config.with_map_size(size);
    }
    if let Some(n) = batch_size {
        config = config.with_batch_size(n);
    }

    let summary = create_dataset(&config)
        .with_context(|| format!("failed to create dataset at {}", config.output_path.display()))?;

    // the sample count itself is logged by the builder
    info!(
        "finished in {} ({} commits, {} skipped)",
        humantime::format_duration(summary.elapsed),
        summary.commits,
        summary.skipped()
    );
    Ok(())
}

fn stat_cmd(dataset: PathBuf) -> Result<()> {
    let reader = DatasetReader::open(&dataset)
        .with_context(|| format!("failed to open dataset {}", dataset.display()))?;
    safe_println!("{}: {} samples", dataset.display(), reader.len());
    Ok(())
}

fn get_cmd(dataset: PathBuf, index: u64, image_out: Option<PathBuf>) -> Result<()> {
    let reader = DatasetReader::open(&dataset)
        .with_context(|| format!("failed to open dataset {}", dataset.display()))?;
    let sample = reader.get(index)?;

    if let Some(path) = image_out {
        fs::write(&path, &sample.image)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote {} image bytes to {}", sample.image.len(), path.display());
    }
    safe_println!("{}", sample.label);
    Ok(())
}

/// Main CLI function
fn main() -> Result<()> {
    // Loads any variables from .env file that are not already set
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Progress lines are INFO, so INFO is the floor here
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    // Initialize tracing-log bridge to capture log crate messages from dependencies
    tracing_log::LogTracer::init().ok();

    match cli.cmd {
        Command::Create {
            input_path,
            gt_file,
            output_path,
            no_check_valid,
            map_size,
            batch_size,
        } => create_cmd(input_path, gt_file, output_path, no_check_valid, map_size, batch_size)?,

        Command::Stat { dataset } => stat_cmd(dataset)?,

        Command::Get { dataset, index, image_out } => get_cmd(dataset, index, image_out)?,
    }

    Ok(())
}
