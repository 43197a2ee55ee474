//! Core type definitions for treesync

mod error;
mod log;
mod node;
mod status;

pub use error::SyncError;
pub use log::ErrorLogEntry;
pub use node::{walk_nodes, FileNode, NodeId};
pub use status::{OverwriteRule, StatusMap, SyncStatus};
