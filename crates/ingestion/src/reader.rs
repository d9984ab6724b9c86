//! ImportReader - tab-delimited transcript import
//!
//! Skips the report preamble, parses every row and runs the field rules.
//! Bad rows are logged on the bus and collected; only an I/O failure aborts.

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use contracts::{ErrorRecord, ImportSection, Severity};
use csv::{ReaderBuilder, StringRecord, Trim};
use dispatcher::Bus;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::config::ImportMetrics;
use crate::error::{IngestionError, Result};
use crate::header::split_preamble;
use crate::record::TrainingRecord;
use crate::validate::FieldRules;

/// Result of one import run
#[derive(Debug, Default)]
pub struct ImportOutcome {
    /// Accepted rows, in file order
    pub records: Vec<TrainingRecord>,
    /// One entry per rejected row, in file order
    pub errors: Vec<ErrorRecord>,
    /// Preamble lines before the header
    pub skipped_lines: usize,
}

impl ImportOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct ImportReader {
    bus: Arc<Bus>,
    header: Regex,
    rules: FieldRules,
    metrics: ImportMetrics,
}

impl ImportReader {
    /// Reader with the default transcript rules
    ///
    /// # Errors
    /// `HeaderPattern` when the configured pattern does not compile
    pub fn new(bus: Arc<Bus>, settings: &ImportSection) -> Result<Self> {
        Ok(Self {
            bus,
            header: Regex::new(&settings.header_pattern)?,
            rules: FieldRules::training_defaults(settings.enforce_required),
            metrics: ImportMetrics::new(),
        })
    }

    /// Replace the field rules
    pub fn with_rules(mut self, rules: FieldRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn metrics(&self) -> &ImportMetrics {
        &self.metrics
    }

    #[instrument(name = "import_read_path", skip(self), fields(path = %path.display()))]
    pub fn read_path(&self, path: &Path) -> Result<ImportOutcome> {
        let file = File::open(path).map_err(|e| {
            let message = format!("cannot open {}: {e}", path.display());
            self.bus.add_message(Severity::Error, &message);
            IngestionError::read(message)
        })?;
        self.read_records(file)
    }

    /// Parse and validate every row of `input`
    pub fn read_records<R: Read>(&self, input: R) -> Result<ImportOutcome> {
        let mut input = BufReader::new(input);
        let preamble = split_preamble(&mut input, &self.header).map_err(|e| self.fail(&e))?;

        let mut outcome = ImportOutcome {
            skipped_lines: preamble.skipped,
            ..Default::default()
        };

        let Some(header) = preamble.header else {
            self.bus.add_message(
                Severity::Warning,
                &format!(
                    "No header row matching '{}' found; nothing imported",
                    self.header.as_str()
                ),
            );
            warn!(skipped = preamble.skipped, "Header row not found");
            return Ok(outcome);
        };

        if preamble.skipped > 0 {
            self.bus.add_message(
                Severity::Diagnostic,
                &format!("Skipped {} line(s) before the header row", preamble.skipped),
            );
        }

        // Line 1 of the csv stream is the header; offset by the preamble
        let offset = preamble.skipped as u64;
        let stream = Cursor::new(header.into_bytes()).chain(input);
        let mut rows = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .comment(Some(b'#'))
            .trim(Trim::All)
            .flexible(true)
            // extracts never quote cells; a '"' is literal text
            .quoting(false)
            .from_reader(stream);

        let headers = rows.headers().map_err(|e| self.fail(&e))?.clone();
        debug!(columns = ?headers, "Header parsed");

        let mut raw = StringRecord::new();
        loop {
            match rows.read_record(&mut raw) {
                Ok(false) => break,
                Ok(true) => {
                    let line = raw.position().map(|p| p.line() + offset);
                    match raw.deserialize::<TrainingRecord>(Some(&headers)) {
                        Ok(record) => self.accept(record, line, &mut outcome),
                        Err(e) => self.reject_parse(&e, line, &mut outcome),
                    }
                }
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                    return Err(self.fail(&e));
                }
                Err(e) => {
                    let line = e.position().map(|p| p.line() + offset);
                    self.reject_parse(&e, line, &mut outcome);
                }
            }
        }

        info!(
            records = outcome.records.len(),
            errors = outcome.errors.len(),
            skipped = outcome.skipped_lines,
            "Import read complete"
        );
        Ok(outcome)
    }

    fn accept(&self, record: TrainingRecord, line: Option<u64>, outcome: &mut ImportOutcome) {
        let failures = self.rules.check(&record);
        if failures.is_empty() {
            self.metrics.record_read();
            outcome.records.push(record);
            return;
        }

        self.metrics.record_rejected();
        let user = record.user_id.as_deref().unwrap_or("<none>");
        let joined = failures.join(" ");
        let text = match line {
            Some(line) => format!("Line {line} (UserID {user}): {joined}"),
            None => format!("UserID {user}: {joined}"),
        };
        self.bus.add_message(Severity::Error, &text);
        outcome
            .errors
            .push(ErrorRecord::validation(line, format!("UserID {user}: {joined}")));
    }

    fn reject_parse(&self, err: &csv::Error, line: Option<u64>, outcome: &mut ImportOutcome) {
        self.metrics.record_parse_error();
        let text = format!("Exception: {err}");
        self.bus.add_message(Severity::Error, &text);
        outcome.errors.push(ErrorRecord::parse(line, text));
    }

    fn fail(&self, err: &dyn std::fmt::Display) -> IngestionError {
        let message = format!("input could not be read: {err}");
        self.bus.add_message(Severity::Error, &message);
        IngestionError::read(message)
    }
}
