//! Staleness classification for source nodes against their destinations

use crate::diff::PathMapper;
use crate::hash::compute_hash;
use crate::types::{FileNode, OverwriteRule, StatusMap, SyncStatus};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Slack applied when comparing modification times; absorbs timestamp
/// truncation differences between filesystem formats.
pub const MTIME_TOLERANCE: Duration = Duration::from_secs(2);

/// Classify one source node against its mapped destination path.
///
/// Returns `Add` when the destination entry is missing, otherwise
/// branches on the rule: `Always` → `Update`, `Never` → `Skip`, and
/// `IfNewer` falls through to a timestamp check (or a content check when
/// `compare_by_hash` is set). Never returns `Done`/`Error`; those are
/// execution-time outcomes.
///
/// The destination is stat'ed fresh on every call; a previous scan of
/// the destination tree is never trusted for this decision.
pub fn compare(
    node: &FileNode,
    dest_path: &Path,
    rule: OverwriteRule,
    compare_by_hash: bool,
) -> SyncStatus {
    let dest_meta = match fs::metadata(dest_path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => return SyncStatus::Add,
        Err(err) => {
            // An unreadable destination is never silently treated as current.
            warn!(path = %dest_path.display(), "destination stat failed: {err}");
            return SyncStatus::Update;
        }
    };

    match rule {
        OverwriteRule::Always => return SyncStatus::Update,
        OverwriteRule::Never => return SyncStatus::Skip,
        OverwriteRule::IfNewer => {}
    }

    // Directories have no content to digest; their staleness is only ever
    // a timestamp question.
    if compare_by_hash && !node.is_dir {
        compare_contents(node, dest_path, &dest_meta)
    } else {
        compare_mtimes(node, &dest_meta)
    }
}

fn compare_mtimes(node: &FileNode, dest_meta: &fs::Metadata) -> SyncStatus {
    let dest_modified = match dest_meta.modified() {
        Ok(modified) => modified,
        Err(err) => {
            warn!("destination modification time unavailable: {err}");
            return SyncStatus::Update;
        }
    };

    match node.modified.duration_since(dest_modified) {
        Ok(ahead) if ahead > MTIME_TOLERANCE => SyncStatus::Update,
        // Within tolerance, or the destination is newer: leave it alone.
        _ => SyncStatus::Skip,
    }
}

fn compare_contents(node: &FileNode, dest_path: &Path, dest_meta: &fs::Metadata) -> SyncStatus {
    // A size mismatch is already proof of difference.
    if dest_meta.len() != node.size {
        return SyncStatus::Update;
    }

    let source_digest = match compute_hash(&node.path) {
        Ok(digest) => digest,
        Err(err) => {
            warn!(path = %node.path.display(), "source digest failed: {err}");
            return SyncStatus::Update;
        }
    };
    let dest_digest = match compute_hash(dest_path) {
        Ok(digest) => digest,
        Err(err) => {
            warn!(path = %dest_path.display(), "destination digest failed: {err}");
            return SyncStatus::Update;
        }
    };

    if source_digest == dest_digest {
        SyncStatus::Skip
    } else {
        SyncStatus::Update
    }
}

/// Classify every node in the forest, producing a status per node id.
///
/// `recursive` gates whether sub-levels are compared at all; when it is
/// off, child nodes simply get no status. Nodes the mapper rejects are
/// logged and left out of the map.
pub fn compare_tree(
    nodes: &[FileNode],
    mapper: &PathMapper,
    rule: OverwriteRule,
    compare_by_hash: bool,
    recursive: bool,
) -> StatusMap {
    let mut statuses = StatusMap::new();
    compare_level(nodes, mapper, rule, compare_by_hash, recursive, &mut statuses);
    statuses
}

fn compare_level(
    nodes: &[FileNode],
    mapper: &PathMapper,
    rule: OverwriteRule,
    compare_by_hash: bool,
    recursive: bool,
    statuses: &mut StatusMap,
) {
    for node in nodes {
        match mapper.map(&node.path) {
            Ok(dest_path) => {
                statuses.insert(node.id, compare(node, &dest_path, rule, compare_by_hash));
            }
            Err(err) => warn!("unmappable node skipped: {err}"),
        }

        if recursive {
            if let Some(children) = &node.children {
                compare_level(children, mapper, rule, compare_by_hash, recursive, statuses);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;
    use filetime::FileTime;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn node_for(path: &Path, modified: SystemTime, size: u64) -> FileNode {
        FileNode::new(NodeId(1), path.to_path_buf(), false, modified, size, None)
    }

    fn write_with_mtime(path: &Path, content: &[u8], mtime: SystemTime) {
        fs::write(path, content).expect("write file");
        filetime::set_file_mtime(path, FileTime::from_system_time(mtime)).expect("set mtime");
    }

    #[test]
    fn test_missing_destination_is_add_under_every_rule() {
        let src = TempDir::new().expect("create src tempdir");
        let source_file = src.path().join("a.txt");
        write_with_mtime(&source_file, b"data", SystemTime::now());
        let node = node_for(&source_file, SystemTime::now(), 4);

        let missing = src.path().join("no-such-dest.txt");
        for rule in [
            OverwriteRule::Always,
            OverwriteRule::Never,
            OverwriteRule::IfNewer,
        ] {
            assert_eq!(compare(&node, &missing, rule, false), SyncStatus::Add);
        }
    }

    #[test]
    fn test_existing_destination_obeys_always_and_never() {
        let dir = TempDir::new().expect("create tempdir");
        let source_file = dir.path().join("src.txt");
        let dest_file = dir.path().join("dst.txt");
        let now = SystemTime::now();
        write_with_mtime(&source_file, b"data", now);
        write_with_mtime(&dest_file, b"data", now);
        let node = node_for(&source_file, now, 4);

        assert_eq!(
            compare(&node, &dest_file, OverwriteRule::Always, false),
            SyncStatus::Update
        );
        assert_eq!(
            compare(&node, &dest_file, OverwriteRule::Never, false),
            SyncStatus::Skip
        );
    }

    #[test]
    fn test_if_newer_applies_the_tolerance_window() {
        let dir = TempDir::new().expect("create tempdir");
        let source_file = dir.path().join("src.txt");
        let dest_file = dir.path().join("dst.txt");
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        write_with_mtime(&source_file, b"data", base);
        write_with_mtime(&dest_file, b"data", base);

        // Exactly at the tolerance boundary: still current.
        let at_boundary = node_for(&source_file, base + MTIME_TOLERANCE, 4);
        assert_eq!(
            compare(&at_boundary, &dest_file, OverwriteRule::IfNewer, false),
            SyncStatus::Skip
        );

        // One second past it: stale.
        let past_boundary = node_for(
            &source_file,
            base + MTIME_TOLERANCE + Duration::from_secs(1),
            4,
        );
        assert_eq!(
            compare(&past_boundary, &dest_file, OverwriteRule::IfNewer, false),
            SyncStatus::Update
        );
    }

    #[test]
    fn test_if_newer_never_downgrades_a_newer_destination() {
        let dir = TempDir::new().expect("create tempdir");
        let source_file = dir.path().join("src.txt");
        let dest_file = dir.path().join("dst.txt");
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        write_with_mtime(&source_file, b"old", base);
        write_with_mtime(&dest_file, b"new", base + Duration::from_secs(100));

        let node = node_for(&source_file, base, 3);
        assert_eq!(
            compare(&node, &dest_file, OverwriteRule::IfNewer, false),
            SyncStatus::Skip
        );
    }

    #[test]
    fn test_hash_mode_skips_identical_content_despite_dates() {
        let dir = TempDir::new().expect("create tempdir");
        let source_file = dir.path().join("src.txt");
        let dest_file = dir.path().join("dst.txt");
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        write_with_mtime(&source_file, b"Content A", base + Duration::from_secs(500));
        write_with_mtime(&dest_file, b"Content A", base);

        let node = node_for(&source_file, base + Duration::from_secs(500), 9);
        assert_eq!(
            compare(&node, &dest_file, OverwriteRule::IfNewer, true),
            SyncStatus::Skip
        );
        // Date mode disagrees on the same pair.
        assert_eq!(
            compare(&node, &dest_file, OverwriteRule::IfNewer, false),
            SyncStatus::Update
        );
    }

    #[test]
    fn test_hash_mode_updates_on_content_difference_despite_equal_dates() {
        let dir = TempDir::new().expect("create tempdir");
        let source_file = dir.path().join("src.txt");
        let dest_file = dir.path().join("dst.txt");
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        write_with_mtime(&source_file, b"Content A", base);
        write_with_mtime(&dest_file, b"Content B", base);

        let node = node_for(&source_file, base, 9);
        assert_eq!(
            compare(&node, &dest_file, OverwriteRule::IfNewer, true),
            SyncStatus::Update
        );
    }

    #[test]
    fn test_hash_mode_short_circuits_on_size_mismatch() {
        let dir = TempDir::new().expect("create tempdir");
        let source_file = dir.path().join("src.txt");
        let dest_file = dir.path().join("dst.txt");
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        write_with_mtime(&source_file, b"longer content", base);
        write_with_mtime(&dest_file, b"short", base);

        let node = node_for(&source_file, base, 14);
        assert_eq!(
            compare(&node, &dest_file, OverwriteRule::IfNewer, true),
            SyncStatus::Update
        );
    }

    #[test]
    fn test_compare_tree_respects_recursive_flag() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        fs::create_dir(src.path().join("sub")).expect("create sub");
        fs::write(src.path().join("sub/inner.txt"), b"x").expect("write inner");
        fs::write(src.path().join("top.txt"), b"y").expect("write top");

        let mapper = PathMapper::new(src.path(), dst.path()).expect("create mapper");
        let tree = crate::scanner::scan(mapper.source_root(), false, true);

        let full = compare_tree(&tree, &mapper, OverwriteRule::IfNewer, false, true);
        assert_eq!(full.len(), 3, "sub, sub/inner.txt, top.txt");

        let shallow = compare_tree(&tree, &mapper, OverwriteRule::IfNewer, false, false);
        assert_eq!(shallow.len(), 2, "only the top level is classified");
    }

    #[test]
    fn test_compare_tree_everything_missing_is_add() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        fs::write(src.path().join("a.txt"), b"a").expect("write a");
        fs::write(src.path().join("b.txt"), b"b").expect("write b");

        let mapper = PathMapper::new(src.path(), dst.path()).expect("create mapper");
        let tree = crate::scanner::scan(mapper.source_root(), false, true);
        let statuses = compare_tree(&tree, &mapper, OverwriteRule::IfNewer, false, true);

        assert!(statuses.values().all(|s| *s == SyncStatus::Add));
    }
}
