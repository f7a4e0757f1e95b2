//! CLI interface definitions for the `ruwalk` application.
//!
//! This module defines command-line arguments using [`clap`] and exposes
//! [`Args`], the struct parsed from CLI inputs and used in `main.rs` to
//! control the walk root, worker count, and output destination.
//!
//! # Example
//!
//! ```bash
//! ruwalk /srv/data --threads 8 --output inventory.dat
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the `ruwalk` filesystem inventory walker.
///
/// The output format is fixed (tab-separated, one line per entry); only the
/// destination file and the degree of parallelism are configurable.
#[derive(Parser, Debug)]
#[command(name = "ruwalk", version, about)]
pub struct Args {
    /// Root path to walk (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Limit the number of worker threads (default: all available CPUs)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Destination file for the record stream (truncated each run)
    #[arg(long, value_name = "FILE", default_value = "output.dat")]
    pub output: PathBuf,
}
