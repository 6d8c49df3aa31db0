//! Ingest gateway - the single write path
//!
//! HTTP submissions, websocket pushes and the demo generator all call
//! [`IngestGateway::submit`], so validation and id assignment are the same
//! whatever the origin.

mod validation;

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::{AnalyticsError, Result};
use crate::live::LiveFeed;
use crate::store::LogStore;
use crate::types::{LogEntry, NewLogEntry};

pub use validation::validate;

/// Where a submission came from, for diagnostics only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestSource {
    Http,
    Push,
    Generator,
}

impl IngestSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestSource::Http => "http",
            IngestSource::Push => "push",
            IngestSource::Generator => "generator",
        }
    }
}

/// Validates payloads, appends them and announces them on the live feed
#[derive(Clone)]
pub struct IngestGateway {
    store: Arc<dyn LogStore>,
    feed: Arc<LiveFeed>,
}

impl IngestGateway {
    pub fn new(store: Arc<dyn LogStore>, feed: Arc<LiveFeed>) -> Self {
        Self { store, feed }
    }

    /// Validate a raw payload and append it.
    ///
    /// Nothing is stored when validation fails.
    pub fn submit(&self, raw: &Value, source: IngestSource) -> Result<LogEntry> {
        let candidate = validate(raw).map_err(|e| {
            warn!(source = source.as_str(), fields = %e, "rejected log entry");
            AnalyticsError::from(e)
        })?;
        self.append(candidate, source)
    }

    /// Append an already validated entry
    pub fn append(&self, candidate: NewLogEntry, source: IngestSource) -> Result<LogEntry> {
        let entry = self.store.append(candidate).map_err(|e| {
            error!(source = source.as_str(), error = %e, "failed to store log entry");
            e
        })?;

        let seq = self.feed.publish(&entry);
        debug!(
            source = source.as_str(),
            id = entry.id,
            level = %entry.level,
            sequence_id = seq,
            "ingested log entry"
        );
        Ok(entry)
    }
}
