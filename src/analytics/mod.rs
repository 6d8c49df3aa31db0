//! Aggregator - statistics and hourly time series
//!
//! Every call recomputes from the current store contents; nothing is cached
//! between calls, so results never go stale and the order in which entries
//! arrived has no effect on them.
//!
//! - [`Aggregator::stats`]: global counts and error rate
//! - [`Aggregator::timeseries`]: `H` hourly buckets ending with the current hour

mod timeseries;

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use rayon::prelude::*;

use crate::error::{AnalyticsError, Result};
use crate::store::LogStore;
use crate::types::{LevelTally, LogStats, TimeSeriesBucket};

pub use timeseries::{bucket_keys, fill_buckets, truncate_to_hour};

/// Read-only analytics over a log store
#[derive(Clone)]
pub struct Aggregator {
    store: Arc<dyn LogStore>,
}

impl Aggregator {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self { store }
    }

    /// Global statistics, served from the store's running tally
    pub fn stats(&self) -> Result<LogStats> {
        Ok(LogStats::from(self.store.tally()?))
    }

    /// Global statistics computed by a full scan of the store
    pub fn stats_by_scan(&self) -> Result<LogStats> {
        let entries = self.store.all()?;
        let tally = entries
            .par_iter()
            .fold(LevelTally::default, |mut tally, e| {
                tally.record(&e.level);
                tally
            })
            .reduce(LevelTally::default, LevelTally::merge);
        Ok(LogStats::from(tally))
    }

    /// Hourly series over the trailing `hours`, using the current time
    pub fn timeseries(&self, hours: i64) -> Result<Vec<TimeSeriesBucket>> {
        // One snapshot of "now" for both bucket layout and the scan
        self.timeseries_at(hours, Utc::now())
    }

    /// Hourly series over the `hours` before `now`.
    ///
    /// Returns exactly `hours` buckets (none when `hours <= 0`), ascending by
    /// start, the last one being the hour that contains `now`. Entries with
    /// `timestamp >= now - hours` are counted in the bucket of their own
    /// truncated hour.
    pub fn timeseries_at(&self, hours: i64, now: DateTime<Utc>) -> Result<Vec<TimeSeriesBucket>> {
        if hours <= 0 {
            return Ok(Vec::new());
        }

        let window_start = TimeDelta::try_hours(hours)
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| {
                AnalyticsError::invalid_argument(format!("window of {hours} hours is out of range"))
            })?;

        let entries = self.store.since(window_start)?;
        Ok(fill_buckets(&entries, hours, now))
    }
}
