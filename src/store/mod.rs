//! Log Store - ordered, append-only retention of log entries
//!
//! The [`LogStore`] trait is the single capability set every backend offers:
//! append, ordered reads, filters and search. Two backends live here:
//!
//! - [`MemoryLogStore`]: in-process ordered collection (default)
//! - [`JsonlLogStore`]: the same collection mirrored to a JSON-lines file
//!
//! All reads return entries newest first, ties broken by descending id.

mod jsonl;
mod memory;

pub use jsonl::JsonlLogStore;
pub use memory::MemoryLogStore;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{newest_first, LevelTally, LogEntry, LogLevel, NewLogEntry};

/// Capability set of an ordered log store.
///
/// Implementations must assign ids atomically (no two appends share an id)
/// and make an appended entry visible to every read that starts afterwards.
pub trait LogStore: Send + Sync {
    /// Assign the next id, store the entry and return the stored copy
    fn append(&self, candidate: NewLogEntry) -> Result<LogEntry>;

    /// Every entry, newest first
    fn all(&self) -> Result<Vec<LogEntry>>;

    /// Number of stored entries
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Entries whose level equals `level` exactly
    fn by_level(&self, level: &LogLevel) -> Result<Vec<LogEntry>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|e| &e.level == level)
            .collect())
    }

    /// Entries with `start <= timestamp <= end`
    fn by_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<LogEntry>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|e| e.timestamp >= start && e.timestamp <= end)
            .collect())
    }

    /// Entries with `timestamp >= start`
    fn since(&self, start: DateTime<Utc>) -> Result<Vec<LogEntry>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|e| e.timestamp >= start)
            .collect())
    }

    /// Case-insensitive substring match against message or level
    fn search(&self, query: &str) -> Result<Vec<LogEntry>> {
        let needle = query.to_lowercase();
        Ok(self
            .all()?
            .into_iter()
            .filter(|e| e.matches_lowercase(&needle))
            .collect())
    }

    /// Per-bucket counts over every stored entry
    fn tally(&self) -> Result<LevelTally> {
        Ok(scan_tally(&self.all()?))
    }
}

/// O(n) reference tally
pub fn scan_tally(entries: &[LogEntry]) -> LevelTally {
    entries.iter().fold(LevelTally::default(), |mut tally, e| {
        tally.record(&e.level);
        tally
    })
}

/// Sort a batch into read order
pub fn sort_newest_first(entries: &mut [LogEntry]) {
    entries.sort_by(newest_first);
}
