//! Sink implementations
//!
//! Contains ConsoleSink, FileSink, MemorySink, and EventLogSink.

mod console;
mod event;
mod file;
mod memory;

pub use self::console::ConsoleSink;
pub use self::event::EventLogSink;
pub use self::file::{FileSink, FileSinkOptions};
pub use self::memory::MemorySink;
