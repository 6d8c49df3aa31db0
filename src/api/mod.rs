//! API module for HTTP, WebSocket and SSE endpoints
//!
//! This module provides the REST API and the live update channels consumed by
//! the dashboard UI.

pub mod http;
pub mod rest;
pub mod sse;
pub mod state;
pub mod websocket;

pub use http::create_router;
pub use state::AppState;
