//! FileSink - exclusive, lock-coordinated log file

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Local;
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};

use contracts::{Environment, FileSinkSection, MessageEvent, Phase};

use crate::bus::{Bus, Handler};
use crate::error::DispatcherError;
use crate::lock::{default_lock_path, ExclusiveLock, DEFAULT_LOCK_TIMEOUT};

/// Lock coordination for a FileSink
#[derive(Debug, Clone)]
pub struct FileSinkOptions {
    /// Lock file shared by every cooperating writer
    pub lock_path: PathBuf,
    /// Bounded wait for the lock
    pub lock_timeout: Duration,
}

impl Default for FileSinkOptions {
    fn default() -> Self {
        Self {
            lock_path: default_lock_path(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }
}

impl FileSinkOptions {
    /// Create options from the configuration section
    pub fn from_config(section: &FileSinkSection) -> Self {
        Self {
            lock_path: section.lock_path.clone().unwrap_or_else(default_lock_path),
            lock_timeout: Duration::from_secs(section.lock_timeout_secs),
        }
    }
}

struct FileSinkState {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    lock: Option<ExclusiveLock>,
}

impl FileSinkState {
    fn write_event(&mut self, event: &MessageEvent) -> io::Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            debug!(path = %self.path.display(), "File sink closed, message dropped");
            return Ok(());
        };
        let line = event.render(&Local::now().naive_local());
        writeln!(writer, "{line}")
    }

    fn close_writer(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn is_released(&self) -> bool {
        self.writer.is_none() && self.lock.is_none()
    }
}

/// Sink for the File environment
///
/// Holds the cross-process lock from construction until the first Stop
/// broadcast or until it is dropped, whichever comes first.
#[must_use = "dropping a FileSink closes the file and releases the lock"]
pub struct FileSink {
    name: String,
    state: Arc<Mutex<FileSinkState>>,
    bus: Weak<Bus>,
    render: Handler,
    stop: Handler,
}

impl FileSink {
    /// Acquire the lock, open `path` and subscribe to the File environment
    ///
    /// # Errors
    /// - `LockTimeout` when another holder keeps the lock past `options.lock_timeout`
    /// - `SinkCreation` when the log file cannot be opened
    #[instrument(
        name = "file_sink_open",
        skip(bus, path, options),
        fields(path = %path.as_ref().display(), lock = %options.lock_path.display())
    )]
    pub fn open(
        bus: &Arc<Bus>,
        path: impl AsRef<Path>,
        options: FileSinkOptions,
    ) -> Result<Self, DispatcherError> {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();

        let lock = ExclusiveLock::acquire(&options.lock_path, options.lock_timeout)?;
        let writer =
            open_log_file(&path).map_err(|e| DispatcherError::sink_creation(&name, e.to_string()))?;

        let state = Arc::new(Mutex::new(FileSinkState {
            path,
            writer: Some(writer),
            lock: Some(lock),
        }));

        let render = {
            let state = Arc::clone(&state);
            Handler::new(move |_, event| {
                let mut state = state.lock();
                if let Err(e) = state.write_event(event) {
                    error!(path = %state.path.display(), error = %e, "Write failed");
                }
            })
        };
        let stop = {
            let state = Arc::clone(&state);
            let bus = Arc::downgrade(bus);
            Handler::new(move |_, event| shutdown(&state, &bus, Some(event), true))
        };

        bus.subscribe(Environment::File, Phase::OnMessage, &render);
        bus.subscribe(Environment::File, Phase::OnStart, &render);
        bus.subscribe(Environment::File, Phase::OnStop, &stop);

        info!(sink = %name, "File sink opened");
        Ok(Self {
            name,
            state,
            bus: Arc::downgrade(bus),
            render,
            stop,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current target file
    pub fn path(&self) -> PathBuf {
        self.state.lock().path.clone()
    }

    /// Whether the sink still holds the lock
    pub fn is_active(&self) -> bool {
        self.state.lock().lock.is_some()
    }

    /// Flush buffered lines without closing
    pub fn flush(&self) -> Result<(), DispatcherError> {
        if let Some(writer) = self.state.lock().writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Retarget the sink: flush and close the current file, then open `path`
    /// (append when it exists, create otherwise)
    #[instrument(name = "file_sink_set_path", skip(self, path), fields(sink = %self.name))]
    pub fn set_path(&self, path: impl AsRef<Path>) -> Result<(), DispatcherError> {
        let path = path.as_ref();
        let mut state = self.state.lock();
        if state.lock.is_none() {
            return Err(DispatcherError::SinkClosed {
                name: self.name.clone(),
            });
        }
        if let Err(e) = state.close_writer() {
            warn!(path = %state.path.display(), error = %e, "Flush of previous file failed");
        }
        state.path = path.to_path_buf();
        state.writer = Some(open_log_file(path)?);
        debug!(path = %path.display(), "File sink retargeted");
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(Environment::File, Phase::OnMessage, &self.render);
            bus.unsubscribe(Environment::File, Phase::OnStart, &self.render);
            bus.unsubscribe(Environment::File, Phase::OnStop, &self.stop);
        }
        shutdown(&self.state, &self.bus, None, false);
    }
}

/// Write the final message, detach, close the file and release the lock
///
/// Every step logs and swallows its own failure so the lock release at the
/// end always runs. A second call is a no-op.
fn shutdown(
    state: &Mutex<FileSinkState>,
    bus: &Weak<Bus>,
    last: Option<&MessageEvent>,
    detach_environment: bool,
) {
    let mut state = state.lock();
    if state.is_released() {
        return;
    }

    if let Some(event) = last {
        if let Err(e) = state.write_event(event) {
            error!(path = %state.path.display(), error = %e, "Final write failed");
        }
    }

    if detach_environment {
        if let Some(bus) = bus.upgrade() {
            bus.unsubscribe_all(Environment::File);
        }
    }

    if let Err(e) = state.close_writer() {
        error!(path = %state.path.display(), error = %e, "Flush on close failed");
    }

    if let Some(lock) = state.lock.take() {
        lock.release();
    }
    info!(path = %state.path.display(), "File sink closed");
}

fn open_log_file(path: &Path) -> io::Result<BufWriter<File>> {
    let file = if path.exists() {
        debug!(path = %path.display(), "Appending to existing log");
        OpenOptions::new().append(true).open(path)?
    } else {
        debug!(path = %path.display(), "Creating log");
        File::create(path)?
    };
    Ok(BufWriter::new(file))
}
