//! Live feed - publish/subscribe channel of newly ingested entries
//!
//! Delivery is best effort: a subscriber that falls more than the channel
//! capacity behind is told how many messages it missed and should reload
//! through the HTTP API. Nothing is acknowledged or replayed.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::{Stream, StreamExt};

use crate::types::LogEntry;

/// Default number of buffered messages per subscriber
pub const DEFAULT_CAPACITY: usize = 1024;

/// Events carried on the live feed
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A new entry was appended to the store
    LogCreated { entry: LogEntry },
}

/// Live feed message wrapper with metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LiveMessage {
    #[serde(flatten)]
    pub event: LiveEvent,

    /// Monotonically increasing sequence ID for gap detection
    pub sequence_id: u64,

    /// Unix timestamp when the message was published
    pub timestamp: i64,
}

/// Outcome of waiting on a subscription
#[derive(Debug)]
pub enum Received {
    Message(LiveMessage),
    /// The subscriber fell behind and this many messages were dropped
    Lagged(u64),
}

/// Broadcast hub for live messages
pub struct LiveFeed {
    tx: broadcast::Sender<LiveMessage>,
    sequence_counter: AtomicU64,
}

impl LiveFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            sequence_counter: AtomicU64::new(0),
        }
    }

    /// Publish a freshly stored entry; returns its sequence id
    pub fn publish(&self, entry: &LogEntry) -> u64 {
        let seq = self.sequence_counter.fetch_add(1, Ordering::SeqCst);
        let msg = LiveMessage {
            event: LiveEvent::LogCreated {
                entry: entry.clone(),
            },
            sequence_id: seq,
            timestamp: chrono::Utc::now().timestamp(),
        };
        // No receivers is not an error
        let _ = self.tx.send(msg);
        seq
    }

    /// Sequence id the next published message will carry
    pub fn current_sequence_id(&self) -> u64 {
        self.sequence_counter.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Start receiving messages published from now on
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A single subscriber's view of the feed.
///
/// Cancel with [`Subscription::cancel`] or by dropping it.
pub struct Subscription {
    rx: broadcast::Receiver<LiveMessage>,
}

impl Subscription {
    /// Wait for the next message. `None` once the feed is gone.
    pub async fn recv(&mut self) -> Option<Received> {
        match self.rx.recv().await {
            Ok(msg) => Some(Received::Message(msg)),
            Err(RecvError::Lagged(n)) => Some(Received::Lagged(n)),
            Err(RecvError::Closed) => None,
        }
    }

    /// Stop receiving; buffered messages are discarded
    pub fn cancel(self) {
        drop(self.rx);
    }

    /// Convert into a stream, for transports that consume streams
    pub fn into_stream(self) -> impl Stream<Item = Received> {
        BroadcastStream::new(self.rx).map(|item| match item {
            Ok(msg) => Received::Message(msg),
            Err(BroadcastStreamRecvError::Lagged(n)) => Received::Lagged(n),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewLogEntry;
    use chrono::Utc;

    fn entry(id: u64) -> LogEntry {
        NewLogEntry::new(Utc::now(), "INFO", "hello").into_entry(id)
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_entry() {
        let feed = LiveFeed::new(8);
        let mut sub = feed.subscribe();

        let seq = feed.publish(&entry(1));
        assert_eq!(seq, 0);
        assert_eq!(feed.current_sequence_id(), 1);

        match sub.recv().await {
            Some(Received::Message(msg)) => {
                assert_eq!(msg.sequence_id, 0);
                let LiveEvent::LogCreated { entry } = msg.event;
                assert_eq!(entry.id, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_subscriber_is_told_it_lagged() {
        let feed = LiveFeed::new(2);
        let mut sub = feed.subscribe();
        for id in 1..=5 {
            feed.publish(&entry(id));
        }

        assert!(matches!(sub.recv().await, Some(Received::Lagged(3))));
    }

    #[tokio::test]
    async fn test_cancel_releases_the_subscription() {
        let feed = LiveFeed::default();
        let sub = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 1);
        sub.cancel();
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_yields_messages() {
        let feed = LiveFeed::new(8);
        let mut stream = Box::pin(feed.subscribe().into_stream());
        feed.publish(&entry(9));

        assert!(matches!(stream.next().await, Some(Received::Message(_))));
    }

    #[test]
    fn test_message_serialization() {
        let msg = LiveMessage {
            event: LiveEvent::LogCreated { entry: entry(3) },
            sequence_id: 42,
            timestamp: 1_700_000_000,
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "log_created");
        assert_eq!(json["sequence_id"], 42);
        assert_eq!(json["entry"]["id"], 3);
    }
}
