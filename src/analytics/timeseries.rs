//! Hourly bucketing of log entries

use std::collections::BTreeMap;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};

use crate::types::{LogEntry, TimeSeriesBucket};

/// Zero the minutes, seconds and sub-second part of `ts`.
///
/// Truncation only fails outside chrono's representable range, where the
/// input is returned as-is.
pub fn truncate_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(TimeDelta::hours(1)).unwrap_or(ts)
}

/// The `hours` bucket keys ending with the hour that contains `now`,
/// oldest first. Empty when `hours <= 0`.
pub fn bucket_keys(hours: i64, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    if hours <= 0 {
        return Vec::new();
    }

    let current_hour = truncate_to_hour(now);
    (0..hours)
        .rev()
        .filter_map(|back| {
            TimeDelta::try_hours(back).and_then(|span| current_hour.checked_sub_signed(span))
        })
        .collect()
}

/// Fill pre-built hourly buckets from `entries`.
///
/// The key space is laid out before any entry is looked at, so empty hours
/// still appear. Each entry is matched by its own truncated hour; entries
/// whose hour has no bucket are left out. Input order does not matter.
pub fn fill_buckets<'a, I>(entries: I, hours: i64, now: DateTime<Utc>) -> Vec<TimeSeriesBucket>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut buckets: BTreeMap<DateTime<Utc>, TimeSeriesBucket> = bucket_keys(hours, now)
        .into_iter()
        .map(|key| (key, TimeSeriesBucket::empty(key)))
        .collect();

    if buckets.is_empty() {
        return Vec::new();
    }

    for entry in entries {
        if let Some(bucket) = buckets.get_mut(&truncate_to_hour(entry.timestamp)) {
            bucket.record(&entry.level);
        }
    }

    buckets.into_values().collect()
}
