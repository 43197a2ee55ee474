//! Configuration management

mod cli;
mod prefs;

pub use cli::Cli;
pub use prefs::{resolve_existing_dir, Prefs};

use crate::types::{OverwriteRule, SyncError};
use std::path::PathBuf;

/// Global configuration for one sync cycle
#[derive(Debug, Clone)]
pub struct Config {
    /// Source directory
    pub source: PathBuf,

    /// Destination directory
    pub destination: PathBuf,

    /// Overwrite policy for existing destination entries
    pub overwrite_rule: OverwriteRule,

    /// Include hidden (dot-prefixed) entries when scanning
    pub copy_hidden_files: bool,

    /// Compare and copy sub-levels; the tree is still scanned recursively
    /// for display either way
    pub recursive_scan: bool,

    /// Stamp destination files with the source timestamps after copying;
    /// when off, the destination gets the current time instead
    pub preserve_attributes: bool,

    /// Compare file contents (blake3) instead of modification times
    pub compare_by_hash: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            overwrite_rule: OverwriteRule::IfNewer,
            copy_hidden_files: false,
            recursive_scan: true,
            preserve_attributes: true,
            compare_by_hash: false,
        }
    }
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), SyncError> {
        if !self.source.is_dir() {
            return Err(SyncError::Config(format!(
                "Source path is not a directory: {}",
                self.source.display()
            )));
        }

        if self.source == self.destination {
            return Err(SyncError::Config(
                "Source and destination cannot be the same".to_string(),
            ));
        }

        Ok(())
    }
}
