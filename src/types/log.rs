//! Error log entries accumulated during a copy run

use chrono::{DateTime, Local};
use std::fmt;
use std::path::PathBuf;

/// One failed item, recorded during execution.
///
/// Entries are append-only and cleared at the start of each new run.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorLogEntry {
    /// When the failure happened
    pub timestamp: DateTime<Local>,
    /// Human-readable failure description
    pub message: String,
    /// The offending path
    pub path: PathBuf,
}

impl ErrorLogEntry {
    /// Record a failure for `path` at the current time.
    pub fn new(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            timestamp: Local::now(),
            message: message.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for ErrorLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.path.display(),
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_carries_message_and_path() {
        let entry = ErrorLogEntry::new("permission denied", "/dest/file.txt");
        assert_eq!(entry.message, "permission denied");
        assert_eq!(entry.path, PathBuf::from("/dest/file.txt"));
    }

    #[test]
    fn test_display_contains_path_and_message() {
        let entry = ErrorLogEntry::new("disk full", "/dest/big.bin");
        let rendered = entry.to_string();
        assert!(rendered.contains("/dest/big.bin"));
        assert!(rendered.contains("disk full"));
    }
}
