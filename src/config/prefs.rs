//! Persisted preferences: the last-used source and destination paths

use crate::types::SyncError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Last-used paths, stored as plain strings in a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefs {
    #[serde(default)]
    pub last_source_path: Option<String>,

    #[serde(default)]
    pub last_dest_path: Option<String>,
}

impl Prefs {
    /// Default preferences location under the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("treesync").join("prefs.toml"))
    }

    /// Load preferences from `path`. Missing or malformed files are not
    /// an error; they simply yield empty preferences.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Write preferences to `path`, creating parent directories.
    pub fn store(&self, path: &Path) -> Result<(), SyncError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self)
            .map_err(|e| SyncError::Config(format!("Failed to serialize preferences: {e}")))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// The stored source path, resolved to the nearest existing directory.
    pub fn last_source(&self) -> Option<PathBuf> {
        self.last_source_path.as_deref().and_then(resolve_existing_dir)
    }

    /// The stored destination path, resolved to the nearest existing directory.
    pub fn last_dest(&self) -> Option<PathBuf> {
        self.last_dest_path.as_deref().and_then(resolve_existing_dir)
    }

    /// Record the paths of a completed run.
    pub fn remember(&mut self, source: &Path, dest: &Path) {
        self.last_source_path = Some(source.to_string_lossy().into_owned());
        self.last_dest_path = Some(dest.to_string_lossy().into_owned());
    }
}

/// Walk upward from a stored path until an existing directory is found.
///
/// A stored file path resolves to its parent directory (the leaf may have
/// been renamed since the path was saved); if nothing on the way up
/// exists, the preference is treated as unset.
pub fn resolve_existing_dir(stored: &str) -> Option<PathBuf> {
    if stored.is_empty() {
        return None;
    }

    let mut current = PathBuf::from(stored);
    loop {
        if current.is_dir() {
            return Some(current);
        }
        if current.is_file() {
            return current.parent().map(Path::to_path_buf);
        }
        if !current.pop() {
            return None;
        }
    }
}
