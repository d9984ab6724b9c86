//! ExclusiveLock - cross-process mutual exclusion for the shared log file
//!
//! Every file sink, in every process, contends for one advisory lock on a
//! fixed lock file. The lock is keyed by that file, not by the log path, so
//! two sinks writing different logs still exclude each other.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use tracing::{debug, instrument, warn};

use crate::error::DispatcherError;

/// Bounded wait used when nothing else is configured (10 minutes)
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(600);

const LOCK_FILE_NAME: &str = "training-import.file-sink.lock";
const INITIAL_BACKOFF: Duration = Duration::from_millis(10);
const MAX_BACKOFF: Duration = Duration::from_millis(250);

/// Fixed lock identity shared by all file sinks on this machine
pub fn default_lock_path() -> PathBuf {
    std::env::temp_dir().join(LOCK_FILE_NAME)
}

/// Held exclusive lock; released by `release` or on drop, exactly once
#[derive(Debug)]
pub struct ExclusiveLock {
    file: Option<File>,
    path: PathBuf,
}

impl ExclusiveLock {
    /// Block until the lock is held or `timeout` elapses
    ///
    /// There is no retry after a timeout: the caller gets `LockTimeout`.
    #[instrument(
        name = "exclusive_lock_acquire",
        skip_all,
        fields(lock = %path.display(), timeout_ms = timeout.as_millis() as u64)
    )]
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, DispatcherError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let started = Instant::now();
        let mut backoff = INITIAL_BACKOFF;
        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => {
                    debug!(
                        waited_ms = started.elapsed().as_millis() as u64,
                        "Lock acquired"
                    );
                    return Ok(Self {
                        file: Some(file),
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if is_contended(&e) => {}
                Err(e) => return Err(e.into()),
            }

            let waited = started.elapsed();
            if waited >= timeout {
                warn!(waited_ms = waited.as_millis() as u64, "Lock wait timed out");
                return Err(DispatcherError::LockTimeout {
                    lock_path: path.to_path_buf(),
                    waited,
                });
            }
            thread::sleep(backoff.min(timeout - waited));
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Release now instead of at drop
    pub fn release(mut self) {
        self.unlock();
    }

    fn unlock(&mut self) {
        let Some(file) = self.file.take() else {
            return;
        };
        match FileExt::unlock(&file) {
            Ok(()) => debug!(lock = %self.path.display(), "Lock released"),
            // Closing the handle below drops the lock anyway
            Err(e) => warn!(lock = %self.path.display(), error = %e, "Explicit unlock failed"),
        }
    }
}

impl Drop for ExclusiveLock {
    fn drop(&mut self) {
        self.unlock();
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use tempfile::tempdir;

    #[test]
    fn test_acquire_and_release() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sink.lock");

        let lock = ExclusiveLock::acquire(&path, Duration::from_millis(100)).unwrap();
        assert!(lock.is_held());
        assert_eq!(lock.path(), path.as_path());
        lock.release();

        // Free again
        let again = ExclusiveLock::acquire(&path, Duration::from_millis(100)).unwrap();
        drop(again);
    }

    #[test]
    fn test_second_acquire_times_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sink.lock");
        let _held = ExclusiveLock::acquire(&path, Duration::from_millis(100)).unwrap();

        let started = Instant::now();
        let err = ExclusiveLock::acquire(&path, Duration::from_millis(200)).unwrap_err();
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(err.is_fatal());
        assert!(matches!(err, DispatcherError::LockTimeout { .. }));
    }

    #[test]
    fn test_waiter_proceeds_after_release() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sink.lock");
        let held = ExclusiveLock::acquire(&path, Duration::from_millis(100)).unwrap();

        let (tx, rx) = mpsc::channel();
        let waiter_path = path.clone();
        let waiter = thread::spawn(move || {
            let result = ExclusiveLock::acquire(&waiter_path, Duration::from_secs(10));
            tx.send(()).unwrap();
            result
        });

        // Still blocked while the first holder keeps the lock
        assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
        held.release();

        let acquired = waiter.join().unwrap();
        assert!(acquired.is_ok());
    }

    #[test]
    fn test_default_lock_path_is_fixed() {
        assert_eq!(default_lock_path(), default_lock_path());
        assert!(default_lock_path().ends_with(LOCK_FILE_NAME));
    }
}
