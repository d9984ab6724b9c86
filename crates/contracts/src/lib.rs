//! # Contracts
//!
//! Frozen interface contracts shared by the logging core, the importer and the CLI.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Message model
//! - `Environment` names a log destination channel
//! - `Phase` selects one of the three broadcast points of a logging session
//! - `Severity` / `Verbosity` drive filtering, `MessageFormat` drives rendering

mod config;
mod environment;
mod error;
mod format;
mod record;
mod severity;

pub use config::*;
pub use environment::{Environment, Phase};
pub use error::*;
pub use format::{MessageEvent, MessageFormat};
pub use record::{ErrorKind, ErrorRecord};
pub use severity::{Severity, Verbosity};
