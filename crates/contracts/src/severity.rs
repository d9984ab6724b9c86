//! Severity levels and the global verbosity filter

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal importance of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Only delivered under `Verbosity::Verbose`
    Diagnostic,
    Info,
    Warning,
    Error,
    /// Unlabelled message
    None,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Diagnostic => "Diagnostic",
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::None => "None",
        }
    }

    /// Label written in front of a message: `"Error:"`, or empty for `None`
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Diagnostic => "Diagnostic:",
            Severity::Info => "Info:",
            Severity::Warning => "Warning:",
            Severity::Error => "Error:",
            Severity::None => "",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Process-wide verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Everything but `Diagnostic`
    #[default]
    Normal,
    /// Everything
    Verbose,
    /// Nothing
    Suppressed,
}

impl Verbosity {
    /// Filter applied before any OnMessage fan-out
    pub fn should_deliver(self, severity: Severity) -> bool {
        match self {
            Verbosity::Suppressed => false,
            Verbosity::Normal => severity != Severity::Diagnostic,
            Verbosity::Verbose => true,
        }
    }
}
