//! Snapshot scanner: walks a root and builds an immutable node tree

use crate::scanner::order::natural_cmp;
use crate::types::{FileNode, NodeId};
use ignore::WalkBuilder;
use std::path::Path;
use std::time::SystemTime;
use tracing::warn;

/// Scan `root` and return its top-level entries as a node forest.
///
/// Nested levels are populated only when `recursive` is true; hidden
/// (dot-prefixed) entries are filtered out unless `include_hidden`.
/// Entries within each directory come back in natural name order.
///
/// Fails soft: a missing or non-directory root yields an empty forest,
/// and unreadable entries are logged and omitted while the rest of the
/// scan continues.
pub fn scan(root: &Path, include_hidden: bool, recursive: bool) -> Vec<FileNode> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(!include_hidden)
        .follow_links(false)
        .sort_by_file_name(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
    if !recursive {
        builder.max_depth(Some(1));
    }

    let mut next_id = 0u64;
    let mut roots: Vec<FileNode> = Vec::new();
    // Open directory frames; entries arrive in pre-order, so the frame a
    // node belongs to is always on top once deeper frames are closed.
    let mut stack: Vec<FileNode> = Vec::new();

    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                continue;
            }
        };

        // Depth 0 is the scan root itself.
        if entry.depth() == 0 {
            continue;
        }

        let file_type = match entry.file_type() {
            Some(ft) => ft,
            None => continue,
        };
        let is_dir = file_type.is_dir();
        if !is_dir && !file_type.is_file() && !file_type.is_symlink() {
            // Pipes, sockets, devices.
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(path = %entry.path().display(), "skipping entry without metadata: {err}");
                continue;
            }
        };
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let size = if is_dir { 0 } else { metadata.len() };

        while stack.len() >= entry.depth() {
            match stack.pop() {
                Some(finished) => attach(&mut stack, &mut roots, finished),
                None => break,
            }
        }

        next_id += 1;
        let node = FileNode::new(
            NodeId(next_id),
            entry.into_path(),
            is_dir,
            modified,
            size,
            if is_dir && recursive {
                Some(Vec::new())
            } else {
                None
            },
        );

        if is_dir && recursive {
            stack.push(node);
        } else {
            attach(&mut stack, &mut roots, node);
        }
    }

    while let Some(finished) = stack.pop() {
        attach(&mut stack, &mut roots, finished);
    }

    roots
}

fn attach(stack: &mut Vec<FileNode>, roots: &mut Vec<FileNode>, node: FileNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.get_or_insert_with(Vec::new).push(node),
        None => roots.push(node),
    }
}
