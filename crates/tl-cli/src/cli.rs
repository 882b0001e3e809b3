//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Task log analyzer.
///
/// Pairs START and END records from a CSV task log, reports how long each
/// task took, and lists tasks that never finished.
#[derive(Debug, Parser)]
#[command(name = "tl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// CSV log with `timestamp,description,START|END,pid` rows.
    pub log_file: Option<PathBuf>,
}
