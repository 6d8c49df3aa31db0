//! Data types for the log analytics server
//!
//! This module contains the entry, level and aggregate structures shared by
//! the store, the aggregator and the HTTP layer.

mod entry;
mod level;
mod stats;

pub use entry::{newest_first, LogEntry, NewLogEntry};
pub use level::{LevelBucket, LogLevel, KNOWN_LEVELS};
pub use stats::{LevelTally, LogStats, TimeSeriesBucket};
