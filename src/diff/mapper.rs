//! Destination path mapping by relative-path substitution

use crate::types::SyncError;
use std::path::{Path, PathBuf};

/// Maps node paths from the source tree onto the destination tree.
///
/// Both roots are canonicalized once at construction so every phase of a
/// scan/compare/execute cycle agrees on one canonical form; symlinked
/// temp and system directories otherwise make the prefix check fail at
/// copy time. Scans should start from [`PathMapper::source_root`] so node
/// paths share that prefix.
#[derive(Debug, Clone)]
pub struct PathMapper {
    source_root: PathBuf,
    dest_root: PathBuf,
}

impl PathMapper {
    /// Create a mapper between two roots. The source root must exist;
    /// the destination is canonicalized only if it already exists.
    pub fn new(source_root: &Path, dest_root: &Path) -> Result<Self, SyncError> {
        let dest_root = dest_root
            .canonicalize()
            .unwrap_or_else(|_| dest_root.to_path_buf());
        Ok(Self {
            source_root: source_root.canonicalize()?,
            dest_root,
        })
    }

    /// The canonicalized source root.
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// The destination root.
    pub fn dest_root(&self) -> &Path {
        &self.dest_root
    }

    /// Map a node's absolute path to the corresponding destination path.
    pub fn map(&self, node_path: &Path) -> Result<PathBuf, SyncError> {
        let relative = node_path
            .strip_prefix(&self.source_root)
            .map_err(|_| SyncError::PathMapping {
                path: node_path.to_path_buf(),
                root: self.source_root.clone(),
            })?;
        Ok(self.dest_root.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_map_reroots_relative_path() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        let mapper = PathMapper::new(src.path(), dst.path()).expect("create mapper");

        let node_path = mapper.source_root().join("sub/file.txt");
        let mapped = mapper.map(&node_path).expect("map path");
        assert_eq!(mapped, mapper.dest_root().join("sub/file.txt"));
    }

    #[test]
    fn test_map_rejects_path_outside_source_root() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        let other = TempDir::new().expect("create other tempdir");
        let mapper = PathMapper::new(src.path(), dst.path()).expect("create mapper");

        let result = mapper.map(&other.path().join("file.txt"));
        assert!(matches!(result, Err(SyncError::PathMapping { .. })));
    }

    #[test]
    fn test_missing_source_root_is_an_error() {
        let dst = TempDir::new().expect("create dst tempdir");
        let result = PathMapper::new(Path::new("/definitely/not/here"), dst.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_destination_root_is_accepted() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        let missing_dest = dst.path().join("not-created-yet");

        let mapper = PathMapper::new(src.path(), &missing_dest).expect("create mapper");
        assert_eq!(mapper.dest_root(), missing_dest.as_path());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_source_root_maps_consistently() {
        let real = TempDir::new().expect("create real tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        fs::write(real.path().join("file.txt"), b"x").expect("write file");

        let holder = TempDir::new().expect("create holder tempdir");
        let link = holder.path().join("alias");
        std::os::unix::fs::symlink(real.path(), &link).expect("create symlink");

        let mapper = PathMapper::new(&link, dst.path()).expect("create mapper");
        // Node paths produced by scanning the canonical root map cleanly.
        let mapped = mapper
            .map(&mapper.source_root().join("file.txt"))
            .expect("map path");
        assert_eq!(mapped, mapper.dest_root().join("file.txt"));
    }
}
