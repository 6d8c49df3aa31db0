//! Log Analytics Server
//!
//! Ingests log entries over HTTP or a websocket push channel, keeps them in an
//! append-only ordered store, and serves statistics, hourly time series and
//! filtered views to a dashboard UI.
//!
//! # Modules
//!
//! - `types`: Core data structures (LogEntry, LogLevel, LogStats, TimeSeriesBucket)
//! - `store`: Ordered append-only log store (in-memory and JSON-lines backends)
//! - `analytics`: Statistics and hourly time-series aggregation
//! - `query`: Validated filter, search and range reads
//! - `ingest`: The single validated write path
//! - `live`: Publish/subscribe feed of newly stored entries
//! - `generator`: Demo seed data and random entry generator
//! - `api`: HTTP, WebSocket and SSE endpoints
//! - `config`: Environment-based server configuration
//! - `logging`: Diagnostic logging setup
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use log_analytics::{AppState, LiveFeed, MemoryLogStore};
//! use log_analytics::api::create_router;
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = Arc::new(AppState::new(
//!         Arc::new(MemoryLogStore::new()),
//!         Arc::new(LiveFeed::default()),
//!     ));
//!     let app = create_router(state);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod generator;
pub mod ingest;
pub mod live;
pub mod logging;
pub mod query;
pub mod store;
pub mod types;

// Re-export commonly used items at crate root
pub use analytics::Aggregator;
pub use api::AppState;
pub use config::ServerConfig;
pub use error::{AnalyticsError, FieldError, Result, ValidationError};
pub use ingest::{IngestGateway, IngestSource};
pub use live::{LiveFeed, LiveMessage, Received, Subscription};
pub use query::{LogFilter, Page, Paged, QueryFacade};
pub use store::{JsonlLogStore, LogStore, MemoryLogStore};
pub use types::{LevelBucket, LogEntry, LogLevel, LogStats, NewLogEntry, TimeSeriesBucket};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
