//! Output sink for finished walk records.
//!
//! Any worker may submit records concurrently from task finalization, so a
//! sink serializes writes internally: each record lands as one whole line,
//! in completion order, with no interleaving inside a line.
//!
//! The on-disk format is fixed: tab-separated, no header, one line per entry:
//!
//! ```text
//! hash  size  depth  width  length  mode  created  modified  accessed  path
//! ```
//!
//! `hash` is 16 zero-padded lowercase hex digits, counters are unsigned
//! decimal, `mode` is the [`EntryKind`](crate::data::EntryKind) code, and
//! timestamps are UTC `YYYY-MM-DDThh:mm:ssZ`. Paths are written unescaped as
//! their raw OS bytes, so non-UTF-8 names pass through intact; a tab or
//! newline embedded in a file name corrupts that line (known limitation).

use crate::data::{EntryRecord, format_timestamp};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Destination for finalized records.
///
/// Implementations must be safe to call from any worker thread.
pub trait RecordSink: Send + Sync {
    /// Writes one finished record. Called exactly once per entry.
    fn submit(&self, record: &EntryRecord) -> io::Result<()>;
}

/// Renders the fixed fields of one record, up to and including the tab that
/// precedes the path. The path itself is appended as raw OS bytes by the
/// sink so non-UTF-8 names survive unmangled.
fn render_fields(record: &EntryRecord) -> String {
    format!(
        "{:016x}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t",
        record.hash,
        record.size,
        record.depth,
        record.width,
        record.length,
        record.kind.code(),
        format_timestamp(record.created),
        format_timestamp(record.modified),
        format_timestamp(record.accessed),
    )
}

/// Renders one record as a tab-separated output line (without newline),
/// with the path rendered lossily for display and tests.
pub fn render_line(record: &EntryRecord) -> String {
    format!("{}{}", render_fields(record), record.path.display())
}

/// File-backed sink writing the fixed TSV format.
///
/// The destination is truncated and recreated on construction; records are
/// buffered, so [`TsvSink::finish`] must run before the process reports
/// success.
pub struct TsvSink {
    writer: Mutex<BufWriter<File>>,
}

impl TsvSink {
    /// Creates (or truncates) the output file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Flushes buffered records to disk.
    pub fn finish(&self) -> io::Result<()> {
        self.writer.lock().flush()
    }
}

impl RecordSink for TsvSink {
    fn submit(&self, record: &EntryRecord) -> io::Result<()> {
        let mut line = render_fields(record).into_bytes();
        line.extend_from_slice(record.path.as_os_str().as_bytes());
        line.push(b'\n');

        let mut writer = self.writer.lock();
        writer.write_all(&line)
    }
}
