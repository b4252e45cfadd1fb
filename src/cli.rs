//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// URL safety scanner driven by a configurable filter chain
#[derive(Parser)]
#[command(
    name = "phishnet",
    version,
    about = "URL safety scanner driven by a configurable filter chain",
    long_about = "Runs a URL through the ordered filters declared in a chain file \
                  and reports whether it is safe to open, with a trace of every \
                  filter that ran."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan a URL through the filter chain
    Scan {
        /// URL to scan (scheme defaults to https)
        url: String,

        /// Chain file to use instead of the configured one
        #[arg(long)]
        chain: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Open the URL in the default browser when allowed
        #[arg(long)]
        open: bool,
    },
    /// Generate default configuration and chain files
    Init {
        /// Path where to create the configuration file
        #[arg(long, short = 'p')]
        path: Option<PathBuf>,
    },
    /// Validate configuration and build the filter chain
    Check {
        /// Chain file to check instead of the configured one
        #[arg(long)]
        chain: Option<PathBuf>,
    },
    /// List registered filter names
    Filters,
    /// Display version information
    Version,
}
