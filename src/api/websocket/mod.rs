//! WebSocket module for real-time UI updates
//!
//! Provides the `/ws` endpoint. Every newly stored entry is pushed to each
//! connected client, and clients may push entries of their own, which go
//! through the same ingest gateway as `POST /api/logs`.

pub mod events;
pub mod handler;

pub use handler::ws_handler;
