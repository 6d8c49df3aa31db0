//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::rest::logs;
use super::sse::live_stream;
use super::state::AppState;
use super::websocket::ws_handler;

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - the dashboard is served from another origin in development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket endpoint
        .route("/ws", get(ws_handler))
        // Health check
        .route("/health", get(health_check))
        // REST API endpoints
        .route("/api/logs", get(logs::list_logs).post(logs::create_log))
        .route("/api/logs/recent", get(logs::recent_logs))
        .route("/api/logs/stats", get(logs::get_stats))
        .route("/api/logs/timeseries", get(logs::get_timeseries))
        .route("/api/logs/search", get(logs::search_logs))
        .route("/api/logs/level/:level", get(logs::logs_by_level))
        .route("/api/logs/range", get(logs::logs_by_range))
        .route("/api/logs/filter", get(logs::filter_logs))
        .route("/api/logs/stream", get(live_stream))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
