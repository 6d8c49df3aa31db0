//! Query façade - validated filter, search and range reads
//!
//! Lenient at write time, strict at read time: ingest keeps any level text,
//! but a level filter must name one of the known levels.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AnalyticsError, Result};
use crate::store::LogStore;
use crate::types::{LogEntry, LogLevel, KNOWN_LEVELS};

/// Default and maximum page sizes
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 1000;

/// Combined filter; every present criterion must hold
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub level: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub query: Option<String>,
}

/// Offset/limit window over a result set
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the unpaginated total
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

/// Validated read access to a log store
#[derive(Clone)]
pub struct QueryFacade {
    store: Arc<dyn LogStore>,
    max_page_size: usize,
}

impl QueryFacade {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self::with_max_page_size(store, MAX_PAGE_SIZE)
    }

    pub fn with_max_page_size(store: Arc<dyn LogStore>, max_page_size: usize) -> Self {
        Self {
            store,
            max_page_size: max_page_size.max(1),
        }
    }

    /// Every entry, newest first
    pub fn all(&self) -> Result<Vec<LogEntry>> {
        self.store.all()
    }

    /// The newest `limit` entries
    pub fn recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let limit = limit.min(self.max_page_size);
        let mut entries = self.store.all()?;
        entries.truncate(limit);
        Ok(entries)
    }

    /// Entries at one of the known levels
    pub fn by_level(&self, level: &str) -> Result<Vec<LogEntry>> {
        let level = parse_level(level)?;
        self.store.by_level(&level)
    }

    /// Entries with `start <= timestamp <= end`
    pub fn by_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<LogEntry>> {
        if start > end {
            return Err(AnalyticsError::invalid_argument(format!(
                "range start {} is after end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        self.store.by_range(start, end)
    }

    /// Case-insensitive search over message and level
    pub fn search(&self, query: Option<&str>) -> Result<Vec<LogEntry>> {
        let query = require_query(query)?;
        self.store.search(query)
    }

    /// Apply every criterion of `filter`, then paginate
    pub fn filter(&self, filter: &LogFilter, page: Page) -> Result<Paged<LogEntry>> {
        let level = filter.level.as_deref().map(parse_level).transpose()?;
        let needle = match filter.query.as_deref() {
            Some(q) => Some(require_query(Some(q))?.to_lowercase()),
            None => None,
        };

        let candidates = match (filter.start, filter.end) {
            (Some(start), Some(end)) => self.by_range(start, end)?,
            (Some(start), None) => self.store.since(start)?,
            (None, end) => {
                let all = self.store.all()?;
                match end {
                    Some(end) => all.into_iter().filter(|e| e.timestamp <= end).collect(),
                    None => all,
                }
            }
        };

        let matching: Vec<LogEntry> = candidates
            .into_iter()
            .filter(|e| level.as_ref().map_or(true, |l| &e.level == l))
            .filter(|e| needle.as_deref().map_or(true, |n| e.matches_lowercase(n)))
            .collect();

        let total = matching.len();
        let limit = page.limit.min(self.max_page_size);
        let items = matching.into_iter().skip(page.offset).take(limit).collect();

        Ok(Paged {
            items,
            total,
            offset: page.offset,
            limit,
        })
    }
}

fn parse_level(raw: &str) -> Result<LogLevel> {
    LogLevel::parse_known(raw).ok_or_else(|| {
        AnalyticsError::invalid_argument(format!(
            "unknown level '{}', expected one of {:?}",
            raw, KNOWN_LEVELS
        ))
    })
}

fn require_query(query: Option<&str>) -> Result<&str> {
    match query {
        Some(q) if !q.is_empty() => Ok(q),
        _ => Err(AnalyticsError::invalid_argument("search query must not be empty")),
    }
}
