//! Aggregate result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LevelBucket, LogLevel};

/// Per-bucket counts over a set of entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelTally {
    pub total: u64,
    pub error: u64,
    pub warn: u64,
    pub info: u64,
}

impl LevelTally {
    pub fn record(&mut self, level: &LogLevel) {
        self.total += 1;
        match level.bucket() {
            LevelBucket::Error => self.error += 1,
            LevelBucket::Warn => self.warn += 1,
            LevelBucket::Info => self.info += 1,
            LevelBucket::Other => {}
        }
    }

    pub fn merge(mut self, other: LevelTally) -> Self {
        self.total += other.total;
        self.error += other.error;
        self.warn += other.warn;
        self.info += other.info;
        self
    }

    /// Entries that fell into none of the named buckets
    pub fn other(&self) -> u64 {
        self.total - self.error - self.warn - self.info
    }
}

/// Global statistics over the whole store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub total_logs: u64,
    pub error_count: u64,
    pub warn_count: u64,
    pub info_count: u64,
    /// Percentage of entries at ERROR, 0 when the store is empty
    pub error_rate: f64,
}

impl From<LevelTally> for LogStats {
    fn from(tally: LevelTally) -> Self {
        let error_rate = if tally.total == 0 {
            0.0
        } else {
            tally.error as f64 / tally.total as f64 * 100.0
        };

        Self {
            total_logs: tally.total,
            error_count: tally.error,
            warn_count: tally.warn,
            info_count: tally.info,
            error_rate,
        }
    }
}

/// One hour of a time series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesBucket {
    /// Start of the hour this bucket covers
    #[serde(rename = "timestamp")]
    pub bucket_start: DateTime<Utc>,
    pub error: u64,
    pub warn: u64,
    pub info: u64,
    pub total: u64,
}

impl TimeSeriesBucket {
    pub fn empty(bucket_start: DateTime<Utc>) -> Self {
        Self {
            bucket_start,
            error: 0,
            warn: 0,
            info: 0,
            total: 0,
        }
    }

    pub fn record(&mut self, level: &LogLevel) {
        self.total += 1;
        match level.bucket() {
            LevelBucket::Error => self.error += 1,
            LevelBucket::Warn => self.warn += 1,
            LevelBucket::Info => self.info += 1,
            LevelBucket::Other => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tally_has_zero_error_rate() {
        let stats = LogStats::from(LevelTally::default());
        assert_eq!(stats.total_logs, 0);
        assert_eq!(stats.error_rate, 0.0);
    }

    #[test]
    fn test_error_rate_is_a_percentage() {
        let mut tally = LevelTally::default();
        for level in ["ERROR", "WARN", "INFO", "DEBUG"] {
            tally.record(&LogLevel::from(level));
        }

        let stats = LogStats::from(tally);
        assert_eq!(stats.total_logs, 4);
        assert!((stats.error_rate - 25.0).abs() < f64::EPSILON);
        assert_eq!(tally.other(), 1);
    }

    #[test]
    fn test_stats_use_camel_case_keys() {
        let json = serde_json::to_value(LogStats::from(LevelTally::default())).unwrap();
        assert!(json.get("totalLogs").is_some());
        assert!(json.get("errorRate").is_some());
    }
}
