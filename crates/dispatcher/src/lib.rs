//! # Dispatcher
//!
//! Logging event-dispatch core.
//!
//! Responsibilities:
//! - Route messages to named environments through an owned `Bus`
//! - Filter by verbosity before any fan-out
//! - Drive the start / message / stop lifecycle of every sink
//! - Coordinate exclusive access to the shared log file across processes

pub mod bus;
pub mod error;
pub mod lock;
pub mod metrics;
pub mod policy;
pub mod sinks;

pub use bus::{Bus, Handler};
pub use contracts::{Environment, MessageEvent, MessageFormat, Phase, Severity, Verbosity};
pub use error::DispatcherError;
pub use lock::{default_lock_path, ExclusiveLock, DEFAULT_LOCK_TIMEOUT};
pub use metrics::{BusMetrics, MetricsSnapshot};
pub use policy::{log_errors, log_if_any_error, log_if_none_error, log_if_null_error, log_outcome};
pub use sinks::{ConsoleSink, EventLogSink, FileSink, FileSinkOptions, MemorySink};
