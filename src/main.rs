//! Main entry point for the `ruwalk` CLI application.
//!
//! `ruwalk` walks a directory tree in parallel and writes one tab-separated
//! record per entry to a fixed-format output file, for filesystem inventory
//! and audit work.
//!
//! # Responsibilities
//! - Parses CLI arguments via [`clap`] using the [`Args`] struct
//! - Initializes the `tracing` subscriber (per-entry skip warnings go to stderr)
//! - Delegates traversal and aggregation to [`walk::Walker`]
//! - Prints a completion summary with entry counts and total bytes
//!
//! Exit code is 0 on normal completion. An unreadable or nonexistent root
//! path, an unwritable output file, or failed record writes abort the run
//! with a descriptive error and a non-zero exit code.

use anyhow::{Context, Result};
use clap::Parser;
use humansize::{DECIMAL, format_size};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::Args;
mod data;
mod output;
use output::{RecordSink, TsvSink};
mod probe;
mod queue;
mod walk;
use walk::{Walker, resolve_worker_count};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let workers = resolve_worker_count(args.threads)?;
    println!(
        "🔧 Walking {} with {} worker thread(s)",
        args.path.display(),
        workers
    );

    let sink = Arc::new(TsvSink::create(&args.output).with_context(|| {
        format!("Failed to create output file '{}'", args.output.display())
    })?);

    // Spinner while the walk runs; record lines go to the file, not the terminal
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner} Walking filesystem... [{elapsed}]")
            .context("Failed to set progress template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let walker = Walker::new(workers);
    let result = walker.run(&args.path, Arc::clone(&sink) as Arc<dyn RecordSink>);
    pb.finish_and_clear();
    let summary = result?;

    sink.finish()
        .with_context(|| format!("Failed to flush output file '{}'", args.output.display()))?;

    println!(
        "📄 {} entries written to {}",
        summary.entries,
        args.output.display()
    );
    println!("💾 Total file bytes: {}", format_size(summary.bytes, DECIMAL));
    println!("⏱️  Completed in {:.2?}", summary.elapsed);
    if summary.skipped > 0 {
        println!(
            "⚠️  {} entries skipped or degraded (details on stderr)",
            summary.skipped
        );
    }

    Ok(())
}
