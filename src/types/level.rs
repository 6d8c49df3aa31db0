//! Log level classification

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a log entry.
///
/// The five named levels are recognised by their exact upper-case spelling at
/// ingest. Any other text is kept verbatim in `Other` so the entry round-trips
/// unchanged, and it counts toward the "other" bucket in aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Exception,
    Other(String),
}

/// Aggregation bucket a level rolls up into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelBucket {
    Error,
    Warn,
    Info,
    Other,
}

/// Names accepted by [`LogLevel::parse_known`]
pub const KNOWN_LEVELS: &[&str] = &["ERROR", "WARN", "INFO", "DEBUG", "EXCEPTION"];

impl LogLevel {
    /// Canonical text of the level
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Exception => "EXCEPTION",
            LogLevel::Other(raw) => raw,
        }
    }

    /// Parse a level name supplied to a query.
    ///
    /// Matching is case-insensitive and limited to the named levels;
    /// free-form text yields `None`.
    pub fn parse_known(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        KNOWN_LEVELS
            .iter()
            .find(|name| name.eq_ignore_ascii_case(trimmed))
            .map(|name| LogLevel::from(name.to_string()))
    }

    pub fn bucket(&self) -> LevelBucket {
        match self {
            LogLevel::Error => LevelBucket::Error,
            LogLevel::Warn => LevelBucket::Warn,
            LogLevel::Info => LevelBucket::Info,
            LogLevel::Debug | LogLevel::Exception | LogLevel::Other(_) => LevelBucket::Other,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, LogLevel::Other(_))
    }
}

impl From<String> for LogLevel {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "ERROR" => LogLevel::Error,
            "WARN" => LogLevel::Warn,
            "INFO" => LogLevel::Info,
            "DEBUG" => LogLevel::Debug,
            "EXCEPTION" => LogLevel::Exception,
            _ => LogLevel::Other(raw),
        }
    }
}

impl From<&str> for LogLevel {
    fn from(raw: &str) -> Self {
        LogLevel::from(raw.to_string())
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
