//! # treesync - One-way Directory Synchronization
//!
//! Scan a source tree, classify every entry against a destination,
//! pick what to include, then execute the copy plan while reporting
//! progress and capturing per-item failures.
//!
//! The pipeline is scan → compare → select → execute; each stage is a
//! separate module and can be driven directly or through the
//! coordinator/worker [`engine`].

// Module declarations
pub mod commands;
pub mod config;
pub mod diff;
pub mod engine;
pub mod executor;
pub mod hash;
pub mod scanner;
pub mod select;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::Config;
pub use types::{ErrorLogEntry, FileNode, NodeId, OverwriteRule, StatusMap, SyncError, SyncStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
