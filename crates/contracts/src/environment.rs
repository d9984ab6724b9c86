//! Log environments and lifecycle phases

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named log destination channel
///
/// An environment is an identity only; the state lives in the sinks
/// subscribed to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Console,
    File,
    Event,
    Database,
}

impl Environment {
    /// All environments, in declaration order
    pub const ALL: [Environment; 4] = [
        Environment::Console,
        Environment::File,
        Environment::Event,
        Environment::Database,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Console => "Console",
            Environment::File => "File",
            Environment::Event => "Event",
            Environment::Database => "Database",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broadcast point of a logging session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    OnStart,
    OnMessage,
    OnStop,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::OnStart, Phase::OnMessage, Phase::OnStop];
}
