//! REST API module for HTTP endpoints
//!
//! - `GET /api/logs` - All entries, newest first
//! - `GET /api/logs/recent` - Newest entries up to a limit
//! - `GET /api/logs/stats` - Global statistics
//! - `GET /api/logs/timeseries?hours=H` - Hourly series
//! - `GET /api/logs/search?q=` - Search message and level
//! - `GET /api/logs/level/:level` - Entries at one level
//! - `GET /api/logs/range?start=&end=` - Entries in a time range
//! - `GET /api/logs/filter` - Combined filter with pagination
//! - `POST /api/logs` - Ingest one entry

pub mod logs;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{AnalyticsError, FieldError};

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

impl ApiError {
    fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            details: Vec::new(),
            retryable: false,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, "BAD_REQUEST")
    }

    pub fn validation(details: Vec<FieldError>) -> Self {
        Self {
            details,
            ..Self::new("Invalid log entry", "VALIDATION_ERROR")
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            retryable: true,
            ..Self::new(message, "STORE_UNAVAILABLE")
        }
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AnalyticsError::Validation(err) => (StatusCode::BAD_REQUEST, ApiError::validation(err.fields)),
            AnalyticsError::InvalidArgument(message) => {
                (StatusCode::BAD_REQUEST, ApiError::bad_request(message))
            }
            AnalyticsError::StoreUnavailable(message) => {
                (StatusCode::SERVICE_UNAVAILABLE, ApiError::unavailable(message))
            }
        };
        (status, Json(body)).into_response()
    }
}
