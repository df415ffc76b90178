//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Work log analyzer.
///
/// Reconstructs work sessions, OCR timing, shortcut usage and idle gaps from
/// application log files.
#[derive(Debug, Parser)]
#[command(name = "wl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze every log file in a directory and summarize per user.
    Analyze {
        /// Directory containing the log files.
        dir: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Analyze a single log file.
    File {
        /// Path to the log file.
        path: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List idle gaps between consecutive log lines.
    Gaps {
        /// Path to the log file.
        path: PathBuf,

        /// Minimum gap in seconds (overrides the configured threshold).
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
        threshold: Option<i64>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
