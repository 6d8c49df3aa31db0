//! Log endpoints

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::api::state::AppState;
use crate::error::{AnalyticsError, Result, ValidationError};
use crate::ingest::IngestSource;
use crate::query::{LogFilter, Page, Paged, DEFAULT_PAGE_SIZE};
use crate::types::{LogEntry, LogStats, TimeSeriesBucket};

/// Window used when `hours` is absent or not a positive number
pub const DEFAULT_HOURS: i64 = 24;
/// Largest window served over HTTP (one year)
pub const MAX_HOURS: i64 = 24 * 365;

/// GET /api/logs - Every entry, newest first
pub async fn list_logs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<LogEntry>>> {
    Ok(Json(state.queries.all()?))
}

/// Entries returned by `recent` when no limit is given
pub const DEFAULT_RECENT: usize = 100;

/// Query parameters for recent entries
#[derive(Debug, Deserialize)]
pub struct RecentParams {
    /// Kept as text so malformed values fall back to the default
    pub limit: Option<String>,
}

/// GET /api/logs/recent - Newest entries
pub async fn recent_logs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecentParams>,
) -> Result<Json<Vec<LogEntry>>> {
    let limit = count_or(params.limit.as_deref(), DEFAULT_RECENT);
    Ok(Json(state.queries.recent(limit)?))
}

/// GET /api/logs/stats - Global statistics
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<LogStats>> {
    Ok(Json(state.aggregator.stats()?))
}

/// Query parameters for the time series
#[derive(Debug, Deserialize)]
pub struct TimeSeriesParams {
    /// Kept as text so malformed values fall back to the default
    pub hours: Option<String>,
}

impl TimeSeriesParams {
    /// Window in hours: absent, unparsable or zero means the default,
    /// negative passes through (empty series), large values are clamped
    pub fn window(&self) -> i64 {
        match self.hours.as_deref().map(|h| h.trim().parse::<i64>()) {
            Some(Ok(0)) | Some(Err(_)) | None => DEFAULT_HOURS,
            Some(Ok(hours)) => hours.min(MAX_HOURS),
        }
    }
}

/// GET /api/logs/timeseries - Hourly buckets over the trailing window
pub async fn get_timeseries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeSeriesParams>,
) -> Result<Json<Vec<TimeSeriesBucket>>> {
    Ok(Json(state.aggregator.timeseries(params.window())?))
}

/// Query parameters for search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search query string
    pub q: Option<String>,
}

/// GET /api/logs/search - Search message and level text
pub async fn search_logs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<LogEntry>>> {
    let hits = state
        .queries
        .search(params.q.as_deref())
        .map_err(|e| match e {
            AnalyticsError::InvalidArgument(_) => {
                AnalyticsError::invalid_argument("Query parameter 'q' is required")
            }
            other => other,
        })?;
    Ok(Json(hits))
}

/// GET /api/logs/level/:level - Entries at one level
pub async fn logs_by_level(
    State(state): State<Arc<AppState>>,
    Path(level): Path<String>,
) -> Result<Json<Vec<LogEntry>>> {
    // URL decode the level (handles encoded characters)
    let decoded = match urlencoding::decode(&level) {
        Ok(l) => l.into_owned(),
        Err(_) => level.clone(),
    };
    Ok(Json(state.queries.by_level(&decoded)?))
}

/// Query parameters for a time range
#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// GET /api/logs/range - Entries with start <= timestamp <= end
pub async fn logs_by_range(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<LogEntry>>> {
    let start = required_time("start", params.start.as_deref())?;
    let end = required_time("end", params.end.as_deref())?;
    Ok(Json(state.queries.by_range(start, end)?))
}

/// Query parameters for the combined filter
#[derive(Debug, Deserialize)]
pub struct FilterParams {
    pub level: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub q: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
}

/// GET /api/logs/filter - Combined filter with pagination
pub async fn filter_logs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Paged<LogEntry>>> {
    let filter = LogFilter {
        level: non_empty(params.level),
        start: optional_time("start", params.start.as_deref())?,
        end: optional_time("end", params.end.as_deref())?,
        query: params.q.filter(|q| !q.is_empty()),
    };
    let page = Page {
        offset: count_or(params.offset.as_deref(), 0),
        limit: count_or(params.limit.as_deref(), DEFAULT_PAGE_SIZE),
    };
    Ok(Json(state.queries.filter(&filter, page)?))
}

/// POST /api/logs - Validate and store one entry
pub async fn create_log(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            let mut err = ValidationError::default();
            err.push("body", format!("malformed JSON: {}", e));
            return AnalyticsError::from(err).into_response();
        }
    };

    match state.ingest.submit(&raw, IngestSource::Http) {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Non-negative count from a query value; absent or malformed means `default`
fn count_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|r| r.trim().parse().ok()).unwrap_or(default)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_time(name: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| {
            AnalyticsError::invalid_argument(format!("'{}' must be an RFC 3339 timestamp", name))
        })
}

fn optional_time(name: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match raw {
        Some(r) if !r.trim().is_empty() => parse_time(name, r).map(Some),
        _ => Ok(None),
    }
}

fn required_time(name: &str, raw: Option<&str>) -> Result<DateTime<Utc>> {
    optional_time(name, raw)?.ok_or_else(|| {
        AnalyticsError::invalid_argument(format!("Query parameter '{}' is required", name))
    })
}
