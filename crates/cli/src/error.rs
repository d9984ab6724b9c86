//! Error types for CLI operations.

use std::path::PathBuf;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Input or configuration file missing
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Interrupted before the import started
    #[error("Interrupted while waiting for the log file lock")]
    Cancelled,

    /// Import finished but rows were rejected and `--fail-on-errors` was set
    #[error("Import rejected {count} row(s)")]
    RowsRejected { count: usize },

    /// Logging core failure (lock timeout, sink creation)
    #[error(transparent)]
    Dispatch(#[from] dispatcher::DispatcherError),

    /// Import aborted
    #[error(transparent)]
    Ingestion(#[from] ingestion::IngestionError),

    /// Blocking worker panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CliError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::Cancelled => 130,
            Self::RowsRejected { .. } => 3,
            Self::Dispatch(e) if e.is_fatal() => 4,
            Self::Dispatch(_) | Self::Ingestion(_) | Self::Task(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_lock_timeout_is_wrapped() {
        let err: CliError = dispatcher::DispatcherError::LockTimeout {
            lock_path: PathBuf::from("/tmp/x.lock"),
            waited: Duration::from_secs(3),
        }
        .into();
        assert!(matches!(
            err,
            CliError::Dispatch(dispatcher::DispatcherError::LockTimeout { .. })
        ));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::file_not_found("a.txt").exit_code(), 2);
        assert_eq!(CliError::RowsRejected { count: 2 }.exit_code(), 3);
        assert_eq!(CliError::Cancelled.exit_code(), 130);
    }
}
