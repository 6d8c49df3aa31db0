//! Shared application state (composition root)

use std::sync::Arc;

use crate::analytics::Aggregator;
use crate::config::ServerConfig;
use crate::ingest::IngestGateway;
use crate::live::LiveFeed;
use crate::query::{QueryFacade, MAX_PAGE_SIZE};
use crate::store::LogStore;

/// Every component wired to one store instance
pub struct AppState {
    pub store: Arc<dyn LogStore>,
    pub queries: QueryFacade,
    pub aggregator: Aggregator,
    pub ingest: IngestGateway,
    pub feed: Arc<LiveFeed>,
}

impl AppState {
    /// Wire all components around `store` with default limits
    pub fn new(store: Arc<dyn LogStore>, feed: Arc<LiveFeed>) -> Self {
        Self::build(store, feed, MAX_PAGE_SIZE)
    }

    /// Wire all components around `store` using the server configuration
    pub fn with_config(store: Arc<dyn LogStore>, config: &ServerConfig) -> Self {
        let feed = Arc::new(LiveFeed::new(config.channel_capacity));
        Self::build(store, feed, config.max_page_size)
    }

    fn build(store: Arc<dyn LogStore>, feed: Arc<LiveFeed>, max_page_size: usize) -> Self {
        Self {
            queries: QueryFacade::with_max_page_size(store.clone(), max_page_size),
            aggregator: Aggregator::new(store.clone()),
            ingest: IngestGateway::new(store.clone(), feed.clone()),
            store,
            feed,
        }
    }

    /// Get the current live-feed sequence ID
    pub fn current_sequence_id(&self) -> u64 {
        self.feed.current_sequence_id()
    }
}
