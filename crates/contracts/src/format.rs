//! Message templates and the event record handed to subscribers

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::Severity;

/// Template used to compose a rendered line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageFormat {
    /// `text`
    Plain,
    /// `<label> text`
    WithSeverityPrefix,
    /// `HH:MM:SS <label> text`
    #[default]
    TimePrefixed,
    /// `MM/DD/YYYY <label> text`
    DatePrefixed,
    /// `MM/DD/YYYY HH:MM:SS <label> text`
    DateTimePrefixed,
}

impl MessageFormat {
    /// strftime pattern of the timestamp token, if the template carries one
    pub fn timestamp_pattern(&self) -> Option<&'static str> {
        match self {
            MessageFormat::Plain | MessageFormat::WithSeverityPrefix => None,
            MessageFormat::TimePrefixed => Some("%H:%M:%S"),
            MessageFormat::DatePrefixed => Some("%m/%d/%Y"),
            MessageFormat::DateTimePrefixed => Some("%m/%d/%Y %H:%M:%S"),
        }
    }

    /// Compose one line (without terminator)
    pub fn render(&self, at: &NaiveDateTime, severity: Severity, text: &str) -> String {
        match self.timestamp_pattern() {
            None if *self == MessageFormat::Plain => text.to_string(),
            None => format!("{} {}", severity.label(), text),
            Some(pattern) => format!("{} {} {}", at.format(pattern), severity.label(), text),
        }
    }
}

/// Record passed to every subscriber callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub severity: Severity,
    pub text: String,
    pub format: MessageFormat,
}

impl MessageEvent {
    pub fn new(severity: Severity, text: impl Into<String>, format: MessageFormat) -> Self {
        Self {
            severity,
            text: text.into(),
            format,
        }
    }

    /// Render with the event's own template
    pub fn render(&self, at: &NaiveDateTime) -> String {
        self.format.render(at, self.severity, &self.text)
    }
}
