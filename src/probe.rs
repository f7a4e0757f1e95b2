//! Metadata probe for the `ruwalk` walker.
//!
//! This module wraps `libc::lstat` to read an entry's type, byte size and
//! timestamps without following symlinks, so a symlink is always reported as
//! its own type rather than its target's.
//!
//! Unlike the output side of the crate, probe failures are surfaced as
//! `io::Error` instead of being masked with zeroed metadata: the walk engine
//! decides whether a failure is fatal (the root) or becomes a per-entry
//! unreadable marker (everything else).

use crate::data::EntryKind;
use libc::{lstat, stat};
use std::ffi::CString;
use std::io;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Raw metadata for a single entry, as returned by [`probe`].
///
/// `size` is the byte length (`st_size`) and is only meaningful for
/// non-directories; directory sizes are computed by aggregation later.
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub kind: EntryKind,
    pub size: u64,
    pub created: i64,
    pub modified: i64,
    pub accessed: i64,
}

/// Reads link-status metadata for `path`.
///
/// # Errors
/// Returns the underlying OS error when the entry cannot be stat'ed
/// (permission denied, vanished mid-walk, broken mount).
pub fn probe(path: &Path) -> io::Result<Probe> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains NUL byte"))?;

    // Use MaybeUninit to avoid undefined behavior with a zeroed stat struct
    let mut stat_buf = MaybeUninit::<stat>::uninit();
    let result = unsafe { lstat(c_path.as_ptr(), stat_buf.as_mut_ptr()) };

    if result != 0 {
        return Err(io::Error::last_os_error());
    }

    let stat_buf = unsafe { stat_buf.assume_init() };
    let kind = kind_from_mode(stat_buf.st_mode);

    Ok(Probe {
        kind,
        size: if kind == EntryKind::Directory {
            0
        } else {
            stat_buf.st_size as u64
        },
        created: stat_buf.st_ctime,
        modified: stat_buf.st_mtime,
        accessed: stat_buf.st_atime,
    })
}

fn kind_from_mode(mode: libc::mode_t) -> EntryKind {
    match mode & libc::S_IFMT {
        libc::S_IFREG => EntryKind::Regular,
        libc::S_IFDIR => EntryKind::Directory,
        libc::S_IFLNK => EntryKind::Symlink,
        _ => EntryKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_probe_regular_file() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let file = dir.path().join("data.bin");
        fs::write(&file, b"0123456789").expect("Failed to write file");

        let probed = probe(&file).expect("probe failed");
        assert_eq!(probed.kind, EntryKind::Regular);
        assert_eq!(probed.size, 10);
        assert!(probed.modified > 0);
    }

    #[test]
    fn test_probe_directory_has_zero_size() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let probed = probe(dir.path()).expect("probe failed");
        assert_eq!(probed.kind, EntryKind::Directory);
        assert_eq!(probed.size, 0);
    }

    #[test]
    fn test_probe_symlink_is_not_followed() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let target = dir.path().join("target.txt");
        fs::write(&target, b"x").expect("Failed to write target");
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).expect("Failed to create symlink");

        let probed = probe(&link).expect("probe failed");
        assert_eq!(probed.kind, EntryKind::Symlink);
    }

    #[test]
    fn test_probe_missing_path_fails() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let missing = dir.path().join("does-not-exist");
        assert!(probe(&missing).is_err());
    }
}
