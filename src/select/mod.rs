//! Tree-shaped inclusion state over a scanned forest
//!
//! Inclusion is tracked as an exclusion set (every node starts included)
//! plus a parent index used for ancestor walks. The index is rebuilt from
//! scratch after every scan; the tree itself stays a strict ownership
//! hierarchy with no back-references.
//!
//! Invariant: an included node's ancestors are all included. Each
//! operation below preserves it by construction; nothing re-validates it
//! afterwards, so new operations must be built the same way.

use crate::types::{walk_nodes, FileNode, NodeId, StatusMap};
use std::collections::{HashMap, HashSet};

/// Inclusion/exclusion state for one scanned tree.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    excluded: HashSet<NodeId>,
    parent: HashMap<NodeId, NodeId>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the parent index for a freshly scanned forest and clear
    /// all exclusions.
    pub fn rebuild(&mut self, nodes: &[FileNode]) {
        self.excluded.clear();
        self.parent.clear();
        self.index_level(nodes, None);
    }

    fn index_level(&mut self, nodes: &[FileNode], parent_id: Option<NodeId>) {
        for node in nodes {
            if let Some(parent_id) = parent_id {
                self.parent.insert(node.id, parent_id);
            }
            if let Some(children) = &node.children {
                self.index_level(children, Some(node.id));
            }
        }
    }

    pub fn is_included(&self, id: NodeId) -> bool {
        !self.excluded.contains(&id)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(&id).copied()
    }

    /// Flip inclusion of one node.
    ///
    /// Including a node pulls every ancestor in with it: the copy plan
    /// never descends past an excluded directory, so a selected child
    /// under an excluded parent would be unreachable. Excluding leaves
    /// descendants untouched; use [`SelectionModel::set_selection`] to
    /// flip a whole subtree.
    pub fn toggle(&mut self, node: &FileNode) {
        if self.excluded.remove(&node.id) {
            self.include_ancestors(node.id);
        } else {
            self.excluded.insert(node.id);
        }
    }

    /// Set one node and every descendant to the same inclusion state.
    pub fn set_selection(&mut self, node: &FileNode, selected: bool) {
        self.apply_subtree(node, selected);
        if selected {
            self.include_ancestors(node.id);
        }
    }

    fn apply_subtree(&mut self, node: &FileNode, selected: bool) {
        if selected {
            self.excluded.remove(&node.id);
        } else {
            self.excluded.insert(node.id);
        }
        if let Some(children) = &node.children {
            for child in children {
                self.apply_subtree(child, selected);
            }
        }
    }

    fn include_ancestors(&mut self, id: NodeId) {
        let mut current = id;
        while let Some(parent_id) = self.parent.get(&current).copied() {
            self.excluded.remove(&parent_id);
            current = parent_id;
        }
    }

    /// Derive the default selection after a scan: exactly the actionable
    /// nodes stay included.
    ///
    /// A node is actionable when its own status is `Add`/`Update` or any
    /// descendant is; everything else lands in the exclusion set. This is
    /// a single bottom-up fold over the tree.
    pub fn smart_select(&mut self, nodes: &[FileNode], statuses: &StatusMap) {
        self.excluded.clear();
        self.mark_level(nodes, statuses);
    }

    /// Returns whether any node at this level ended up included.
    fn mark_level(&mut self, nodes: &[FileNode], statuses: &StatusMap) -> bool {
        let mut any_included = false;
        for node in nodes {
            let mut included = false;

            if let Some(children) = &node.children {
                if self.mark_level(children, statuses) {
                    included = true;
                }
            }
            if statuses.get(&node.id).is_some_and(|s| s.is_actionable()) {
                included = true;
            }

            if included {
                any_included = true;
            } else {
                self.excluded.insert(node.id);
            }
        }
        any_included
    }

    /// Toggle between "every actionable node is selected" and "nothing
    /// is selected".
    ///
    /// When all actionable nodes are currently included, everything is
    /// excluded; otherwise the set is rebuilt by excluding everything and
    /// re-including the actionable nodes plus their ancestors, which also
    /// clears ad hoc manual selections on non-actionable nodes.
    pub fn toggle_select_all(&mut self, nodes: &[FileNode], statuses: &StatusMap) {
        let mut all_ids = Vec::new();
        let mut actionable = Vec::new();
        walk_nodes(nodes, &mut |node| {
            all_ids.push(node.id);
            if statuses.get(&node.id).is_some_and(|s| s.is_actionable()) {
                actionable.push(node.id);
            }
        });

        // Vacuously true when nothing is actionable: deselect all.
        let all_targets_selected = actionable.iter().all(|id| self.is_included(*id));

        self.excluded = all_ids.into_iter().collect();
        if !all_targets_selected {
            for id in actionable {
                self.excluded.remove(&id);
                self.include_ancestors(id);
            }
        }
    }
}
