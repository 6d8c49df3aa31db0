//! In-memory ordered log store

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rayon::prelude::*;

use super::LogStore;
use crate::error::Result;
use crate::types::{LevelTally, LogEntry, LogLevel, NewLogEntry};

/// Threshold for using parallel search (entry count)
const PARALLEL_SEARCH_THRESHOLD: usize = 1000;

/// Entries keyed by `(timestamp, id)` so iteration order is chronological
/// and reverse iteration is the read order.
#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<(DateTime<Utc>, u64), LogEntry>,
    next_id: u64,
    tally: LevelTally,
}

/// In-process log store guarded by a single reader/writer lock
#[derive(Debug)]
pub struct MemoryLogStore {
    inner: RwLock<Inner>,
}

impl MemoryLogStore {
    /// Create an empty store; the first append receives id 1
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    /// Rebuild a store from previously persisted entries.
    ///
    /// Ids continue after the largest loaded id.
    pub fn from_entries(entries: impl IntoIterator<Item = LogEntry>) -> Self {
        let mut inner = Inner {
            next_id: 1,
            ..Default::default()
        };
        for entry in entries {
            inner.next_id = inner.next_id.max(entry.id + 1);
            inner.tally.record(&entry.level);
            inner.entries.insert(entry.order_key(), entry);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Append with a commit hook that runs under the write lock.
    ///
    /// The entry becomes visible only if `before_commit` succeeds; on error
    /// the id is not consumed and nothing is stored.
    pub(crate) fn append_with<F>(&self, candidate: NewLogEntry, before_commit: F) -> Result<LogEntry>
    where
        F: FnOnce(&LogEntry) -> Result<()>,
    {
        let mut inner = self.inner.write();
        let entry = candidate.into_entry(inner.next_id);

        before_commit(&entry)?;

        inner.next_id += 1;
        inner.tally.record(&entry.level);
        inner.entries.insert(entry.order_key(), entry.clone());
        Ok(entry)
    }

    /// Id the next append will receive
    pub fn next_id(&self) -> u64 {
        self.inner.read().next_id
    }
}

impl Default for MemoryLogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStore for MemoryLogStore {
    fn append(&self, candidate: NewLogEntry) -> Result<LogEntry> {
        self.append_with(candidate, |_| Ok(()))
    }

    fn all(&self) -> Result<Vec<LogEntry>> {
        let inner = self.inner.read();
        Ok(inner.entries.values().rev().cloned().collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.inner.read().entries.len())
    }

    fn by_level(&self, level: &LogLevel) -> Result<Vec<LogEntry>> {
        let inner = self.inner.read();
        Ok(inner
            .entries
            .values()
            .rev()
            .filter(|e| &e.level == level)
            .cloned()
            .collect())
    }

    fn by_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<LogEntry>> {
        if start > end {
            return Ok(Vec::new());
        }
        let inner = self.inner.read();
        Ok(inner
            .entries
            .range((start, 0)..=(end, u64::MAX))
            .rev()
            .map(|(_, e)| e.clone())
            .collect())
    }

    fn since(&self, start: DateTime<Utc>) -> Result<Vec<LogEntry>> {
        let inner = self.inner.read();
        Ok(inner
            .entries
            .range((start, 0)..)
            .rev()
            .map(|(_, e)| e.clone())
            .collect())
    }

    fn search(&self, query: &str) -> Result<Vec<LogEntry>> {
        let needle = query.to_lowercase();
        let inner = self.inner.read();

        if inner.entries.len() > PARALLEL_SEARCH_THRESHOLD {
            // rayon keeps the chronological order on collect
            let mut matches: Vec<LogEntry> = inner
                .entries
                .par_iter()
                .filter(|(_, e)| e.matches_lowercase(&needle))
                .map(|(_, e)| e.clone())
                .collect();
            matches.reverse();
            Ok(matches)
        } else {
            Ok(inner
                .entries
                .values()
                .rev()
                .filter(|e| e.matches_lowercase(&needle))
                .cloned()
                .collect())
        }
    }

    fn tally(&self) -> Result<LevelTally> {
        Ok(self.inner.read().tally)
    }
}
