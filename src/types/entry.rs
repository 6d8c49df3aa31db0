//! Log entry types

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LogLevel;

/// A stored log entry. Immutable once the store has assigned its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    /// Free text; may span several lines (stack traces)
    pub message: String,
}

/// A validated entry that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl NewLogEntry {
    pub fn new(timestamp: DateTime<Utc>, level: impl Into<LogLevel>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level: level.into(),
            message: message.into(),
        }
    }

    /// Attach the store-assigned id
    pub fn into_entry(self, id: u64) -> LogEntry {
        LogEntry {
            id,
            timestamp: self.timestamp,
            level: self.level,
            message: self.message,
        }
    }
}

impl LogEntry {
    /// Key under which stores keep entries in chronological order
    pub fn order_key(&self) -> (DateTime<Utc>, u64) {
        (self.timestamp, self.id)
    }

    /// Case-insensitive substring match on message or level text.
    /// `needle` must already be lower-cased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.message.to_lowercase().contains(needle)
            || self.level.as_str().to_lowercase().contains(needle)
    }
}

/// Read ordering: newest timestamp first, ties broken by descending id
pub fn newest_first(a: &LogEntry, b: &LogEntry) -> Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| b.id.cmp(&a.id))
}
