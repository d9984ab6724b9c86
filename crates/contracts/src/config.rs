//! ImporterConfig - Config Loader output
//!
//! Tunables for the logging core and the importer. Sinks are never selected
//! here; callers register them programmatically.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::{MessageFormat, Verbosity};

/// Default wait for the shared file-sink lock (10 minutes)
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 600;

/// Default header line of a training extract
pub const DEFAULT_HEADER_PATTERN: &str = r"^UserID\tTitle";

/// Complete importer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ImporterConfig {
    /// Message filtering and rendering
    #[serde(default)]
    #[validate(nested)]
    pub logging: LoggingSection,

    /// Shared file sink coordination
    #[serde(default)]
    #[validate(nested)]
    pub file_sink: FileSinkSection,

    /// Record reading
    #[serde(default)]
    #[validate(nested)]
    pub import: ImportSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoggingSection {
    #[serde(default)]
    pub verbosity: Verbosity,

    #[serde(default)]
    pub message_format: MessageFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FileSinkSection {
    /// Lock file shared by every process writing through a file sink.
    /// `None` selects the fixed default under the temp directory.
    #[serde(default)]
    pub lock_path: Option<PathBuf>,

    /// Bounded wait for the lock, seconds
    #[serde(default = "default_lock_timeout_secs")]
    #[validate(range(min = 1, max = 86400))]
    pub lock_timeout_secs: u64,
}

impl Default for FileSinkSection {
    fn default() -> Self {
        Self {
            lock_path: None,
            lock_timeout_secs: DEFAULT_LOCK_TIMEOUT_SECS,
        }
    }
}

fn default_lock_timeout_secs() -> u64 {
    DEFAULT_LOCK_TIMEOUT_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ImportSection {
    /// When false, `Required` rules always pass
    #[serde(default = "default_enforce_required")]
    pub enforce_required: bool,

    /// Regex matching the header row; earlier lines are preamble
    #[serde(default = "default_header_pattern")]
    #[validate(length(min = 1))]
    pub header_pattern: String,
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            enforce_required: true,
            header_pattern: default_header_pattern(),
        }
    }
}

fn default_enforce_required() -> bool {
    true
}

fn default_header_pattern() -> String {
    DEFAULT_HEADER_PATTERN.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ImporterConfig::default();
        assert_eq!(config.logging.verbosity, Verbosity::Normal);
        assert_eq!(config.logging.message_format, MessageFormat::TimePrefixed);
        assert_eq!(config.file_sink.lock_timeout_secs, 600);
        assert!(config.import.enforce_required);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_fills_defaults() {
        let config: ImporterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.file_sink.lock_timeout_secs, DEFAULT_LOCK_TIMEOUT_SECS);
        assert_eq!(config.import.header_pattern, DEFAULT_HEADER_PATTERN);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ImporterConfig::default();
        config.file_sink.lock_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
