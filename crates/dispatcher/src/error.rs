//! Dispatcher error types

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Waited too long for the shared file-sink lock
    #[error("waited {waited:?} for file sink lock '{}' without acquiring it", .lock_path.display())]
    LockTimeout { lock_path: PathBuf, waited: Duration },

    /// Raised by the conditional logging helpers; always logged before it is returned
    #[error("{message}")]
    PolicyFailure { message: String },

    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Operation on a sink that already released its resources
    #[error("sink '{name}' is closed")]
    SinkClosed { name: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a policy failure
    pub fn policy_failure(message: impl Into<String>) -> Self {
        Self::PolicyFailure {
            message: message.into(),
        }
    }

    /// Lock timeouts end the current construction attempt; retrying inside it is pointless
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::LockTimeout { .. })
    }
}
