//! Error types for treesync

use std::path::PathBuf;
use thiserror::Error;

/// Error types for treesync operations.
///
/// The scanner and comparator never surface these to the caller; they
/// degrade to empty/partial results with diagnostics. The executor
/// catches copy failures per item and records them in the error log.
/// What remains here is configuration validation, path-mapping defense,
/// and engine lifecycle.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A node path that does not lie under the source root
    #[error("Path {path} is not under source root {root}", path = .path.display(), root = .root.display())]
    PathMapping { path: PathBuf, root: PathBuf },

    /// A source was supplied but no destination is known yet
    #[error("Destination directory is still required")]
    DestinationRequired,

    /// The engine worker has shut down
    #[error("Sync engine is closed")]
    EngineClosed,
}

impl SyncError {
    /// Check if this error is a configuration problem
    pub fn is_config_error(&self) -> bool {
        matches!(self, SyncError::Config(_) | SyncError::DestinationRequired)
    }

    /// Check if this error is the path-mapping defense firing
    pub fn is_mapping_error(&self) -> bool {
        matches!(self, SyncError::PathMapping { .. })
    }
}
