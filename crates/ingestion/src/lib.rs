//! # Ingestion
//!
//! Training-record import, the producer side of the logging core.
//!
//! Responsibilities:
//! - Skip the report preamble up to the header row
//! - Parse tab-delimited rows into `TrainingRecord`
//! - Run the ordered field rules and collect an error list
//! - Report every rejected row on the bus
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dispatcher::{Bus, ConsoleSink};
//! use ingestion::ImportReader;
//!
//! let bus = Arc::new(Bus::new());
//! let _console = ConsoleSink::attach(&bus);
//! let reader = ImportReader::new(Arc::clone(&bus), &Default::default())?;
//! let outcome = reader.read_path("transcripts.txt".as_ref())?;
//! println!("{} records, {} errors", outcome.records.len(), outcome.errors.len());
//! ```

mod config;
mod error;
mod header;
mod reader;
mod record;
mod validate;

// Re-exports
pub use config::{ImportMetrics, MetricsSnapshot};
pub use contracts::{ErrorKind, ErrorRecord, ImportSection};
pub use error::{IngestionError, Result};
pub use header::{split_preamble, Preamble};
pub use reader::{ImportOutcome, ImportReader};
pub use record::TrainingRecord;
pub use validate::{
    Currency, DateFormat, FieldRules, RegexFormat, Required, SelectOption, Validator,
};
