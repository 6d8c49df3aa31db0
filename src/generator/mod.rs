//! Demo data: startup seed entries and a periodic random-entry generator
//!
//! Both go through the ingest gateway like any other producer.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::Result;
use crate::ingest::{IngestGateway, IngestSource};
use crate::types::{LogLevel, NewLogEntry};

const ERROR_MESSAGES: &[&str] = &[
    "Database connection timeout after 30 seconds",
    "Failed to process payment transaction",
    "Authentication failed for user",
    "Memory allocation error in heap space",
    "Network connection refused",
    "File not found exception occurred",
    "Invalid JSON format in request body",
    "SQL constraint violation detected",
];

const WARN_MESSAGES: &[&str] = &[
    "High memory usage detected: 85% of heap space used",
    "API rate limit approaching: 950/1000 requests",
    "Slow database query detected (>2s execution time)",
    "Cache miss rate is above threshold (>20%)",
    "Deprecated API endpoint accessed",
    "Configuration value using default setting",
    "Connection pool size approaching maximum",
    "Disk space usage above 80%",
];

const INFO_MESSAGES: &[&str] = &[
    "User authentication successful",
    "System backup completed successfully",
    "New user registration completed",
    "Cache refreshed successfully",
    "Scheduled task executed successfully",
    "Configuration reloaded from file",
    "Health check passed for all services",
    "Data synchronization completed",
];

const SOURCES: &[&str] = &[
    "UserService",
    "PaymentService",
    "AuthService",
    "DatabaseService",
    "CacheService",
    "NotificationService",
    "ReportService",
    "ApiGateway",
];

/// The sample entries seeded into an empty store, relative to `now`
pub fn seed_entries(now: DateTime<Utc>) -> Vec<NewLogEntry> {
    let samples: [(i64, &str, &str); 6] = [
        (
            5,
            "ERROR",
            "Database connection timeout after 30 seconds. Connection pool exhausted.\n\tat com.example.DatabasePool.getConnection(DatabasePool.java:145)\n\tat com.example.UserService.findUser(UserService.java:67)",
        ),
        (
            10,
            "WARN",
            "High memory usage detected: 85% of heap space used. Consider increasing memory allocation.",
        ),
        (
            15,
            "INFO",
            "User authentication successful for user: admin@example.com",
        ),
        (
            20,
            "ERROR",
            "Failed to process payment transaction ID: txn_1234567890\nReason: Invalid credit card number\nUser ID: usr_9876543210",
        ),
        (
            25,
            "WARN",
            "API rate limit approaching: 950/1000 requests in current window",
        ),
        (
            30,
            "INFO",
            "System backup completed successfully. Backup size: 2.3GB, Duration: 45 minutes",
        ),
    ];

    samples
        .into_iter()
        .map(|(minutes_ago, level, message)| {
            NewLogEntry::new(now - TimeDelta::minutes(minutes_ago), level, message)
        })
        .collect()
}

/// Ingest the sample entries. Returns how many were stored.
pub fn seed(gateway: &IngestGateway) -> Result<usize> {
    let entries = seed_entries(Utc::now());
    let count = entries.len();
    for candidate in entries {
        gateway.append(candidate, IngestSource::Generator)?;
    }
    info!(count, "seeded demo log entries");
    Ok(count)
}

/// One random entry: 10% ERROR, 15% WARN, 45% INFO, 20% DEBUG, 10% TRACE
pub fn random_entry<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> NewLogEntry {
    let roll = rng.random_range(0..100);
    let source = SOURCES[rng.random_range(0..SOURCES.len())];

    let (level, message) = match roll {
        0..=9 => (LogLevel::Error, pick(rng, ERROR_MESSAGES).to_string()),
        10..=24 => (LogLevel::Warn, pick(rng, WARN_MESSAGES).to_string()),
        25..=69 => (LogLevel::Info, pick(rng, INFO_MESSAGES).to_string()),
        70..=89 => (LogLevel::Debug, debug_message(rng)),
        _ => (LogLevel::from("TRACE"), format!("Trace: {}", debug_message(rng))),
    };

    NewLogEntry::new(now, level, format!("[{}] {}", source, message))
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, choices: &[&'a str]) -> &'a str {
    choices[rng.random_range(0..choices.len())]
}

fn debug_message<R: Rng + ?Sized>(rng: &mut R) -> String {
    match rng.random_range(0..6) {
        0 => format!("Processing request with ID: REQ-{}", Utc::now().timestamp_millis()),
        1 => format!("Cache lookup performed for key: user_session_{}", rng.random_range(0..1000)),
        2 => format!("Database query executed in {}ms", rng.random_range(50..550)),
        3 => format!("Thread pool status: {}/10 active threads", rng.random_range(1..=10)),
        4 => format!("Memory usage: {}% of allocated heap", rng.random_range(40..70)),
        _ => format!("Network latency measured: {}ms", rng.random_range(10..110)),
    }
}

/// Spawn a task that ingests one random entry every `interval`.
/// Abort the returned handle to stop it.
pub fn spawn_generator(gateway: IngestGateway, interval: Duration) -> JoinHandle<()> {
    info!(interval_secs = interval.as_secs(), "starting demo log generator");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let candidate = random_entry(&mut rand::rng(), Utc::now());
            if let Err(e) = gateway.append(candidate, IngestSource::Generator) {
                warn!(error = %e, "demo generator could not store entry");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::LiveFeed;
    use crate::store::{LogStore, MemoryLogStore};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_seed_entries_are_recent_and_mixed() {
        let now = Utc::now();
        let entries = seed_entries(now);
        assert_eq!(entries.len(), 6);
        assert!(entries.iter().all(|e| e.timestamp < now));
        assert_eq!(entries.iter().filter(|e| e.level == LogLevel::Error).count(), 2);
        assert!(entries[0].message.contains("\n\tat "));
    }

    #[test]
    fn test_seed_goes_through_gateway() {
        let store = Arc::new(MemoryLogStore::new());
        let gateway = IngestGateway::new(store.clone(), Arc::new(LiveFeed::default()));

        assert_eq!(seed(&gateway).unwrap(), 6);
        let stats = store.tally().unwrap();
        assert_eq!((stats.error, stats.warn, stats.info), (2, 2, 2));
    }

    #[test]
    fn test_random_entries_cover_every_bucket() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();
        let levels: Vec<LogLevel> = (0..500).map(|_| random_entry(&mut rng, now).level).collect();

        assert!(levels.contains(&LogLevel::Error));
        assert!(levels.contains(&LogLevel::Warn));
        assert!(levels.contains(&LogLevel::Info));
        assert!(levels.iter().any(|l| !l.is_known() || *l == LogLevel::Debug));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generator_ingests_on_each_tick() {
        let store = Arc::new(MemoryLogStore::new());
        let gateway = IngestGateway::new(store.clone(), Arc::new(LiveFeed::default()));

        let handle = spawn_generator(gateway, Duration::from_secs(5));
        tokio::time::sleep(Duration::from_secs(16)).await;
        handle.abort();

        assert_eq!(store.len().unwrap(), 3);
    }
}
