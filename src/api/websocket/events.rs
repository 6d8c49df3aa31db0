//! WebSocket message types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FieldError;
use crate::types::LogEntry;

/// Messages a client may send
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ping for heartbeat
    Ping,

    /// Push one log entry through the ingest gateway
    Ingest { entry: Value },
}

/// Direct replies and notices sent to one client.
/// Live entries themselves go out as [`crate::live::LiveMessage`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once on connection
    Connected { current_sequence_id: u64 },

    Pong,

    /// The pushed entry was stored
    Ingested { entry: LogEntry },

    /// The pushed entry was not stored
    Rejected {
        error: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        details: Vec<FieldError>,
    },

    Error { code: String, message: String },
}

impl ServerMessage {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}
