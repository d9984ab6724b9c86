//! Error records produced by the importer and fed into the logging helpers

use serde::{Deserialize, Serialize};
use std::fmt;

/// What went wrong with an input row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A field rule rejected the row
    Validation,
    /// The row could not be read at all
    Parse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => f.write_str("validation"),
            ErrorKind::Parse => f.write_str("parse"),
        }
    }
}

/// One entry of the ordered error list surfaced to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    /// 1-based line in the source, when known
    pub line: Option<u64>,
    pub message: String,
}

impl ErrorRecord {
    pub fn validation(line: Option<u64>, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            line,
            message: message.into(),
        }
    }

    pub fn parse(line: Option<u64>, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Parse,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "[{}] line {}: {}", self.kind, line, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_line() {
        let rec = ErrorRecord::validation(Some(4), "The UserID field is required.");
        assert_eq!(
            rec.to_string(),
            "[validation] line 4: The UserID field is required."
        );
    }

    #[test]
    fn test_display_without_line() {
        let rec = ErrorRecord::parse(None, "Exception: bad row");
        assert_eq!(rec.to_string(), "[parse] Exception: bad row");
    }
}
