//! File copy primitive

use crate::types::SyncError;
use filetime::FileTime;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// Copy a file using the write-then-rename strategy.
///
/// Data is streamed into a temporary `.part` file, flushed to disk, then
/// renamed over the destination so an existing entry is replaced in one
/// step and a failed copy never leaves a truncated destination behind.
///
/// With `preserve_attributes` the destination receives the source's
/// modification time; without it, both timestamps are explicitly set to
/// the current time (a raw copy primitive may otherwise implicitly keep
/// the source's).
///
/// Returns the number of bytes copied.
pub fn copy_file(src: &Path, dest: &Path, preserve_attributes: bool) -> Result<u64, SyncError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let part_path = dest.with_extension("part");

    let mut src_file = File::open(src)?;
    let mut part_file = File::create(&part_path)?;

    let mut buffer = vec![0u8; 128 * 1024];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = src_file.read(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        part_file.write_all(&buffer[0..bytes_read])?;
        total_bytes += bytes_read as u64;
    }

    part_file.sync_all()?;
    // Drop the handle before rename (required on Windows).
    drop(part_file);

    let stamp = if preserve_attributes {
        let src_metadata = fs::metadata(src)?;
        FileTime::from_system_time(src_metadata.modified()?)
    } else {
        FileTime::now()
    };
    filetime::set_file_times(&part_path, stamp, stamp)?;

    // Atomic on POSIX systems; replaces any existing destination entry.
    fs::rename(&part_path, dest)?;

    Ok(total_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_copy_creates_parent_directories() {
        let dir = TempDir::new().expect("create tempdir");
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("deep/nested/dest.txt");
        fs::write(&src, b"payload").expect("write src");

        let bytes = copy_file(&src, &dest, true).expect("copy file");
        assert_eq!(bytes, 7);
        assert_eq!(fs::read(&dest).expect("read dest"), b"payload");
    }

    #[test]
    fn test_copy_replaces_existing_destination() {
        let dir = TempDir::new().expect("create tempdir");
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("dest.txt");
        fs::write(&src, b"new").expect("write src");
        fs::write(&dest, b"stale old content").expect("write dest");

        copy_file(&src, &dest, true).expect("copy file");
        assert_eq!(fs::read(&dest).expect("read dest"), b"new");
    }

    #[test]
    fn test_preserve_attributes_keeps_source_mtime() {
        let dir = TempDir::new().expect("create tempdir");
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("dest.txt");
        fs::write(&src, b"data").expect("write src");

        let old = SystemTime::now() - Duration::from_secs(10_000);
        filetime::set_file_mtime(&src, FileTime::from_system_time(old)).expect("set src mtime");

        copy_file(&src, &dest, true).expect("copy file");

        let dest_mtime = fs::metadata(&dest)
            .and_then(|m| m.modified())
            .expect("dest mtime");
        let drift = dest_mtime
            .duration_since(old)
            .unwrap_or_else(|e| e.duration());
        assert!(drift < Duration::from_secs(2), "mtime should match source");
    }

    #[test]
    fn test_no_preserve_stamps_current_time() {
        let dir = TempDir::new().expect("create tempdir");
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("dest.txt");
        fs::write(&src, b"data").expect("write src");

        let old = SystemTime::now() - Duration::from_secs(10_000);
        filetime::set_file_mtime(&src, FileTime::from_system_time(old)).expect("set src mtime");

        copy_file(&src, &dest, false).expect("copy file");

        let dest_mtime = fs::metadata(&dest)
            .and_then(|m| m.modified())
            .expect("dest mtime");
        let age = SystemTime::now()
            .duration_since(dest_mtime)
            .unwrap_or_default();
        assert!(age < Duration::from_secs(60), "mtime should be fresh");
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let dir = TempDir::new().expect("create tempdir");
        let result = copy_file(
            &dir.path().join("absent.txt"),
            &dir.path().join("dest.txt"),
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_no_part_file_left_behind() {
        let dir = TempDir::new().expect("create tempdir");
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("dest.txt");
        fs::write(&src, b"data").expect("write src");

        copy_file(&src, &dest, true).expect("copy file");
        assert!(!dir.path().join("dest.part").exists());
    }
}
