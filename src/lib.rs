//! Library crate for ruwalk
//!
//! `ruwalk` recursively walks a directory tree with a fixed pool of worker
//! threads and writes one record per entry, combining raw metadata (size,
//! type, timestamps) with subtree statistics (aggregate size, direct-child
//! count, subtree depth) computed bottom-up during the walk.
//!
//! # Modules
//!
//! - [`data`]: Core data structures (`EntryRecord`, `EntryKind`)
//! - [`cli`]: Command-line interface definitions
//! - [`probe`]: `lstat`-based metadata probe
//! - [`queue`]: Blocking work queue with termination detection
//! - [`walk`]: Worker pool and aggregation engine
//! - [`output`]: Record sink and fixed TSV rendering

pub mod cli;
pub mod data;
pub mod output;
pub mod probe;
pub mod queue;
pub mod walk;

pub use cli::Args;
pub use data::{EntryKind, EntryRecord};
pub use output::{RecordSink, TsvSink};
pub use walk::{WalkSummary, Walker};
