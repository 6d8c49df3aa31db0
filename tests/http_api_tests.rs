//! HTTP API tests driven through the router

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use log_analytics::api::create_router;
use log_analytics::{
    AnalyticsError, AppState, LiveFeed, LogEntry, LogStore, MemoryLogStore, NewLogEntry, Result,
};

fn setup() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        Arc::new(MemoryLogStore::new()),
        Arc::new(LiveFeed::default()),
    ));
    (create_router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, body: impl Into<Body>) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/logs")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap(),
    )
    .await
}

fn entry_body(level: &str, message: &str) -> String {
    json!({
        "timestamp": Utc::now().to_rfc3339(),
        "level": level,
        "message": message,
    })
    .to_string()
}

#[tokio::test]
async fn test_create_log_returns_created_entry() {
    let (app, state) = setup();

    let (status, body) = post(&app, entry_body("ERROR", "Disk full")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 1);
    assert_eq!(body["level"], "ERROR");
    assert_eq!(body["message"], "Disk full");
    assert_eq!(state.store.len().unwrap(), 1);
}

#[tokio::test]
async fn test_create_log_rejects_invalid_payload() {
    let (app, state) = setup();

    let (status, body) = post(&app, json!({ "level": 5 }).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"timestamp"));
    assert!(fields.contains(&"level"));
    assert!(fields.contains(&"message"));
    assert_eq!(state.store.len().unwrap(), 0);
}

#[tokio::test]
async fn test_create_log_rejects_malformed_json() {
    let (app, _) = setup();

    let (status, body) = post(&app, "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"][0]["field"], "body");
}

#[tokio::test]
async fn test_stats_and_timeseries() {
    let (app, _) = setup();
    for (level, msg) in [("ERROR", "a"), ("WARN", "b"), ("INFO", "c"), ("INFO", "d")] {
        post(&app, entry_body(level, msg)).await;
    }

    let (status, stats) = get(&app, "/api/logs/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalLogs"], 4);
    assert_eq!(stats["errorCount"], 1);
    assert_eq!(stats["warnCount"], 1);
    assert_eq!(stats["infoCount"], 2);
    assert_eq!(stats["errorRate"], 25.0);

    let (status, series) = get(&app, "/api/logs/timeseries?hours=3").await;
    assert_eq!(status, StatusCode::OK);
    let series = series.as_array().unwrap();
    assert_eq!(series.len(), 3);
    let total: u64 = series.iter().map(|b| b["total"].as_u64().unwrap()).sum();
    assert_eq!(total, 4);
    assert!(series[0].get("timestamp").is_some());

    let (_, default_series) = get(&app, "/api/logs/timeseries?hours=abc").await;
    assert_eq!(default_series.as_array().unwrap().len(), 24);

    let (_, negative) = get(&app, "/api/logs/timeseries?hours=-5").await;
    assert!(negative.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_requires_query() {
    let (app, _) = setup();
    post(&app, entry_body("ERROR", "Connection timeout")).await;
    post(&app, entry_body("INFO", "All good")).await;

    let (status, body) = get(&app, "/api/logs/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Query parameter 'q' is required");

    let (status, body) = get(&app, "/api/logs/search?q=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = get(&app, "/api/logs/search?q=TIMEOUT").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_logs_by_level_and_listing_order() {
    let (app, _) = setup();
    for (level, msg) in [("WARN", "one"), ("INFO", "two"), ("WARN", "three")] {
        post(&app, entry_body(level, msg)).await;
    }

    let (status, body) = get(&app, "/api/logs/level/warn").await;
    assert_eq!(status, StatusCode::OK);
    let warns = body.as_array().unwrap();
    assert_eq!(warns.len(), 2);
    assert!(warns.iter().all(|e| e["level"] == "WARN"));

    let (status, _) = get(&app, "/api/logs/level/VERBOSE").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, all) = get(&app, "/api/logs").await;
    let entries: Vec<LogEntry> = serde_json::from_value(all).unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries
        .windows(2)
        .all(|w| (w[0].timestamp, w[0].id) > (w[1].timestamp, w[1].id)));
}

#[tokio::test]
async fn test_range_and_filter() {
    let (app, _) = setup();
    for (ts, level) in [
        ("2024-05-01T10:00:00Z", "ERROR"),
        ("2024-05-01T11:00:00Z", "INFO"),
        ("2024-05-01T12:00:00Z", "ERROR"),
        ("2024-05-01T13:00:00Z", "WARN"),
    ] {
        let body = json!({ "timestamp": ts, "level": level, "message": "x" }).to_string();
        post(&app, body).await;
    }

    let (status, body) = get(
        &app,
        "/api/logs/range?start=2024-05-01T11:00:00Z&end=2024-05-01T12:00:00Z",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = get(&app, "/api/logs/range?start=2024-05-01T11:00:00Z").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(
        &app,
        "/api/logs/range?start=2024-05-01T12:00:00Z&end=2024-05-01T11:00:00Z",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, page) = get(&app, "/api/logs/filter?level=ERROR&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["items"][0]["timestamp"], "2024-05-01T12:00:00Z");
}

#[tokio::test]
async fn test_malformed_paging_values_fall_back_to_defaults() {
    let (app, _) = setup();
    for msg in ["a", "b", "c"] {
        post(&app, entry_body("INFO", msg)).await;
    }

    let (status, page) = get(&app, "/api/logs/filter?limit=-1&offset=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["offset"], 0);
    assert_eq!(page["limit"], 100);
    assert_eq!(page["items"].as_array().unwrap().len(), 3);

    let (status, recent) = get(&app, "/api/logs/recent?limit=-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recent.as_array().unwrap().len(), 3);

    let (status, recent) = get(&app, "/api/logs/recent?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recent.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_whitespace_search_is_not_rejected() {
    let (app, _) = setup();
    post(&app, entry_body("INFO", "a b")).await;
    post(&app, entry_body("INFO", "ab")).await;

    let (status, body) = get(&app, "/api/logs/search?q=%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, page) = get(&app, "/api/logs/filter?q=%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
}

/// Store whose backend is gone
struct UnavailableStore;

impl LogStore for UnavailableStore {
    fn append(&self, _candidate: NewLogEntry) -> Result<LogEntry> {
        Err(AnalyticsError::StoreUnavailable("disk detached".into()))
    }

    fn all(&self) -> Result<Vec<LogEntry>> {
        Err(AnalyticsError::StoreUnavailable("disk detached".into()))
    }

    fn len(&self) -> Result<usize> {
        Err(AnalyticsError::StoreUnavailable("disk detached".into()))
    }
}

#[tokio::test]
async fn test_store_failure_maps_to_unavailable() {
    let state = Arc::new(AppState::new(
        Arc::new(UnavailableStore),
        Arc::new(LiveFeed::default()),
    ));
    let app = create_router(state);

    let (status, body) = get(&app, "/api/logs/stats").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
    assert_eq!(body["retryable"], true);

    let (status, _) = get(&app, "/api/logs/search?q=x").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = post(&app, entry_body("INFO", "lost")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
