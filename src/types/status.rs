//! Per-node sync classification and the overwrite policy

use super::NodeId;
use std::collections::HashMap;

/// What the executor should do, or did, with a node.
///
/// The comparator only ever produces `Add`/`Update`/`Skip`; `Done` and
/// `Error` are terminal outcomes recorded during execution. Status lives
/// in a [`StatusMap`] keyed by node id rather than on the node itself,
/// since it depends on the destination root and the active rule, not on
/// the source entry alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncStatus {
    /// Destination entry is missing
    Add,
    /// Destination exists but the source wins under the active rule
    Update,
    /// Destination is current or newer
    Skip,
    /// Copied successfully in the current run
    Done,
    /// Copy attempt failed in the current run
    Error,
}

impl SyncStatus {
    /// Only `Add` and `Update` nodes are eligible for a copy plan;
    /// `Skip`/`Done`/`Error` are never re-copied within the same run.
    pub fn is_actionable(self) -> bool {
        matches!(self, SyncStatus::Add | SyncStatus::Update)
    }
}

/// Overwrite policy for destination entries that already exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OverwriteRule {
    /// Replace the destination unconditionally
    Always,
    /// Never replace an existing destination entry
    Never,
    /// Replace only when the source is newer than the destination
    #[default]
    IfNewer,
}

/// Map from node id to its current classification
pub type StatusMap = HashMap<NodeId, SyncStatus>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_add_and_update_are_actionable() {
        assert!(SyncStatus::Add.is_actionable());
        assert!(SyncStatus::Update.is_actionable());
        assert!(!SyncStatus::Skip.is_actionable());
        assert!(!SyncStatus::Done.is_actionable());
        assert!(!SyncStatus::Error.is_actionable());
    }

    #[test]
    fn test_default_rule_is_if_newer() {
        assert_eq!(OverwriteRule::default(), OverwriteRule::IfNewer);
    }
}
