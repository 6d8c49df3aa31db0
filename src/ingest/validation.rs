//! Shape validation of raw ingest payloads

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::ValidationError;
use crate::types::{LogLevel, NewLogEntry};

/// Check every required field of `raw` and build the candidate entry.
///
/// All problems are collected before returning, so one response lists
/// every failing field.
pub fn validate(raw: &Value) -> Result<NewLogEntry, ValidationError> {
    let mut errors = ValidationError::default();

    let Some(object) = raw.as_object() else {
        errors.push("body", "expected a JSON object with timestamp, level and message");
        return Err(errors);
    };

    let timestamp = match object.get("timestamp") {
        None | Some(Value::Null) => {
            errors.push("timestamp", "is required");
            None
        }
        Some(value) => match parse_timestamp(value) {
            Ok(ts) => Some(ts),
            Err(message) => {
                errors.push("timestamp", message);
                None
            }
        },
    };

    let level = match object.get("level") {
        None | Some(Value::Null) => {
            errors.push("level", "is required");
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.push("level", "must not be empty");
            None
        }
        Some(Value::String(s)) => Some(LogLevel::from(s.clone())),
        Some(_) => {
            errors.push("level", "must be a string");
            None
        }
    };

    let message = match object.get("message") {
        None | Some(Value::Null) => {
            errors.push("message", "is required");
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push("message", "must be a string");
            None
        }
    };

    match (timestamp, level, message) {
        (Some(timestamp), Some(level), Some(message)) if errors.is_empty() => Ok(NewLogEntry {
            timestamp,
            level,
            message,
        }),
        _ => Err(errors),
    }
}

/// RFC 3339 text with an offset, or Unix epoch milliseconds
fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>, String> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| format!("'{}' is not an RFC 3339 timestamp with offset: {}", text, e)),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| format!("{} is not a valid epoch-millisecond timestamp", n)),
        _ => Err("must be an RFC 3339 string or epoch milliseconds".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_valid_payload() {
        let candidate = validate(&json!({
            "timestamp": "2024-03-01T10:15:00+02:00",
            "level": "ERROR",
            "message": "Failed to process payment\nReason: declined"
        }))
        .unwrap();

        assert_eq!(
            candidate.timestamp,
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 15, 0).unwrap()
        );
        assert_eq!(candidate.level, LogLevel::Error);
        assert!(candidate.message.contains('\n'));
    }

    #[test]
    fn test_epoch_millis_are_accepted() {
        let candidate = validate(&json!({
            "timestamp": 1_700_000_000_000i64,
            "level": "INFO",
            "message": ""
        }))
        .unwrap();
        assert_eq!(candidate.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_unknown_level_is_kept() {
        let candidate = validate(&json!({
            "timestamp": "2024-03-01T10:15:00Z",
            "level": "TRACE",
            "message": "x"
        }))
        .unwrap();
        assert_eq!(candidate.level, LogLevel::Other("TRACE".to_string()));
    }

    #[test]
    fn test_every_failing_field_is_reported() {
        let err = validate(&json!({
            "timestamp": "yesterday",
            "level": 3
        }))
        .unwrap_err();

        assert_eq!(err.fields.len(), 3);
        assert!(err.has_field("timestamp"));
        assert!(err.has_field("level"));
        assert!(err.has_field("message"));
    }

    #[test]
    fn test_timestamp_without_offset_is_rejected() {
        let err = validate(&json!({
            "timestamp": "2024-03-01T10:15:00",
            "level": "INFO",
            "message": "x"
        }))
        .unwrap_err();
        assert!(err.has_field("timestamp"));
    }

    #[test]
    fn test_non_object_body() {
        let err = validate(&json!(["not", "an", "object"])).unwrap_err();
        assert!(err.has_field("body"));
    }
}
