//! Command-line interface definition

use super::{Config, Prefs};
use crate::types::{OverwriteRule, SyncError};
use clap::Parser;
use std::path::PathBuf;

/// One-way directory synchronization
#[derive(Debug, Parser)]
#[command(name = "treesync", version, about)]
pub struct Cli {
    /// Source directory (may be handed off by a file manager)
    pub source: Option<PathBuf>,

    /// Destination directory
    pub destination: Option<PathBuf>,

    /// Include hidden (dot-prefixed) entries
    #[arg(long)]
    pub hidden: bool,

    /// Compare and copy only the top level of the source tree
    #[arg(long)]
    pub no_recursive: bool,

    /// Overwrite policy for existing destination entries
    #[arg(long, value_enum, default_value_t = OverwriteRule::IfNewer)]
    pub overwrite: OverwriteRule,

    /// Compare file contents instead of modification times
    #[arg(long)]
    pub hash: bool,

    /// Stamp destination files with the current time instead of the
    /// source timestamps
    #[arg(long)]
    pub no_preserve: bool,

    /// Preferences file location
    #[arg(long)]
    pub prefs: Option<PathBuf>,
}

impl Cli {
    /// Merge command-line arguments with persisted preferences into a
    /// validated [`Config`].
    ///
    /// A source given without a destination is reported as
    /// [`SyncError::DestinationRequired`] so the surrounding layer can
    /// prompt for one; the stored last-used pair is only used when both
    /// positionals are absent.
    pub fn into_config(self, prefs: &Prefs) -> Result<Config, SyncError> {
        let (source, destination) = match (self.source, self.destination) {
            (Some(source), Some(destination)) => (source, destination),
            (Some(_), None) => return Err(SyncError::DestinationRequired),
            (None, _) => {
                let source = prefs.last_source().ok_or_else(|| {
                    SyncError::Config("Source directory required".to_string())
                })?;
                let destination = prefs.last_dest().ok_or(SyncError::DestinationRequired)?;
                (source, destination)
            }
        };

        let config = Config {
            source,
            destination,
            overwrite_rule: self.overwrite,
            copy_hidden_files: self.hidden,
            recursive_scan: !self.no_recursive,
            preserve_attributes: !self.no_preserve,
            compare_by_hash: self.hash,
        };
        config.validate()?;
        Ok(config)
    }
}
