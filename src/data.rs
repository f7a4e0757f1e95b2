//! Data structures for representing finished walk records.
//!
//! This module defines the core data structures used throughout the `ruwalk`
//! application: the per-entry [`EntryRecord`] produced by the walk, the
//! [`EntryKind`] type code, and the path/timestamp helpers shared by the
//! engine and the output layer.

use fnv::FnvHasher;
use std::hash::Hasher;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// A finished record for one filesystem entry.
///
/// Records are built up by the walk engine and become immutable at
/// finalization, when the entry's subtree statistics are complete.
///
/// # Fields
/// * `path` - Absolute path to the entry (symlinks not resolved)
/// * `hash` - FNV-1a 64-bit digest of `path`, run-local identifier only
/// * `size` - Byte length for non-directories; sum of direct child sizes for directories
/// * `depth` - Distance from the walk root (root = 0)
/// * `width` - Number of direct children (directories only, 0 otherwise)
/// * `length` - Distance to the deepest entry below (directories only, 0 otherwise)
/// * `kind` - Entry type, see [`EntryKind`]
/// * `created` / `modified` / `accessed` - Unix seconds from `lstat`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub path: PathBuf,
    pub hash: u64,
    pub size: u64,
    pub depth: u64,
    pub width: u64,
    pub length: u64,
    pub kind: EntryKind,
    pub created: i64,
    pub modified: i64,
    pub accessed: i64,
}

/// The type of a filesystem entry, as seen by `lstat` (never follows links).
///
/// The numeric codes are what the output file carries in its `mode` column:
///
/// | kind       | code |
/// |------------|------|
/// | Other      | 0    |
/// | Regular    | 1    |
/// | Directory  | 2    |
/// | Symlink    | 3    |
/// | Unreadable | 4    |
///
/// `Unreadable` marks an entry whose metadata probe failed (vanished mid-walk,
/// permission denied); its record carries zeroed size and timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Other,
    Regular,
    Directory,
    Symlink,
    Unreadable,
}

impl EntryKind {
    /// Returns the numeric code written to the output's `mode` column.
    pub fn code(&self) -> u8 {
        match self {
            EntryKind::Other => 0,
            EntryKind::Regular => 1,
            EntryKind::Directory => 2,
            EntryKind::Symlink => 3,
            EntryKind::Unreadable => 4,
        }
    }

    /// Returns a string representation of the kind for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Other => "OTHER",
            EntryKind::Regular => "FILE",
            EntryKind::Directory => "DIR",
            EntryKind::Symlink => "SYMLINK",
            EntryKind::Unreadable => "UNREADABLE",
        }
    }
}

/// Calculates the 64-bit FNV-1a digest of a path's raw byte representation.
///
/// The digest is a run-local identifier only: it is stable within one
/// invocation but carries no cross-run or cross-implementation guarantee.
pub fn path_hash(path: &Path) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(path.as_os_str().as_bytes());
    hasher.finish()
}

/// Renders unix seconds as `YYYY-MM-DDThh:mm:ssZ` in UTC.
///
/// Out-of-range values fall back to the unix epoch.
pub fn format_timestamp(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .unwrap_or_default()
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_entry_kind_codes() {
        assert_eq!(EntryKind::Other.code(), 0);
        assert_eq!(EntryKind::Regular.code(), 1);
        assert_eq!(EntryKind::Directory.code(), 2);
        assert_eq!(EntryKind::Symlink.code(), 3);
        assert_eq!(EntryKind::Unreadable.code(), 4);
    }

    #[test]
    fn test_entry_kind_as_str() {
        assert_eq!(EntryKind::Regular.as_str(), "FILE");
        assert_eq!(EntryKind::Directory.as_str(), "DIR");
        assert_eq!(EntryKind::Unreadable.as_str(), "UNREADABLE");
    }

    #[test]
    fn test_path_hash_is_stable_within_run() {
        let a = PathBuf::from("/var/log/syslog");
        assert_eq!(path_hash(&a), path_hash(&a));
        assert_ne!(path_hash(&a), path_hash(&PathBuf::from("/var/log")));
    }

    #[test]
    fn test_format_timestamp_epoch() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_format_timestamp_utc() {
        // 2021-01-01T00:00:00Z
        assert_eq!(format_timestamp(1609459200), "2021-01-01T00:00:00Z");
    }
}
