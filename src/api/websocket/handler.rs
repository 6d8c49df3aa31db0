//! WebSocket connection handler

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use serde::Serialize;
use tracing::{debug, info};

use super::events::{ClientMessage, ServerMessage};
use crate::api::state::AppState;
use crate::error::AnalyticsError;
use crate::ingest::IngestSource;
use crate::live::Received;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before the welcome so nothing published in between is lost
    let mut subscription = state.feed.subscribe();
    info!(subscribers = state.feed.subscriber_count(), "live client connected");

    let welcome = ServerMessage::Connected {
        current_sequence_id: state.current_sequence_id(),
    };
    if !send_json(&mut socket, &welcome).await {
        return; // Client disconnected immediately
    }

    loop {
        tokio::select! {
            // Live entries to client
            received = subscription.recv() => {
                let delivered = match received {
                    Some(Received::Message(msg)) => send_json(&mut socket, &msg).await,
                    Some(Received::Lagged(n)) => {
                        // Client is too slow, tell it to reload over HTTP
                        let lagged = ServerMessage::error(
                            "lagged",
                            format!("Missed {} log entries, please refresh", n),
                        );
                        send_json(&mut socket, &lagged).await
                    }
                    None => false, // Feed closed
                };
                if !delivered {
                    break;
                }
            }

            // Handle client messages
            result = socket.recv() => {
                match result {
                    Some(Ok(msg)) => {
                        if !handle_client_message(msg, &mut socket, &state).await {
                            break; // Client requested close or error
                        }
                    }
                    Some(Err(_)) => break, // WebSocket error
                    None => break, // Client disconnected
                }
            }
        }
    }

    subscription.cancel();
    info!("live client disconnected");
}

/// Handle a message from the client.
/// Returns false if the connection should be closed
async fn handle_client_message(msg: Message, socket: &mut WebSocket, state: &AppState) -> bool {
    match msg {
        Message::Text(text) => {
            let reply = match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Ping) => ServerMessage::Pong,
                Ok(ClientMessage::Ingest { entry }) => ingest_reply(state, &entry),
                Err(e) => {
                    debug!(error = %e, "unreadable client message");
                    ServerMessage::error("bad_message", e.to_string())
                }
            };
            send_json(socket, &reply).await
        }
        Message::Binary(_) => true, // Ignore binary messages
        Message::Ping(data) => socket.send(Message::Pong(data)).await.is_ok(),
        Message::Pong(_) => true, // Ignore pong responses
        Message::Close(_) => false, // Client requested close
    }
}

/// Push-channel ingest: same gateway as HTTP
fn ingest_reply(state: &AppState, raw: &serde_json::Value) -> ServerMessage {
    match state.ingest.submit(raw, IngestSource::Push) {
        Ok(entry) => ServerMessage::Ingested { entry },
        Err(AnalyticsError::Validation(err)) => ServerMessage::Rejected {
            error: "Invalid log entry".to_string(),
            details: err.fields,
        },
        Err(e) => ServerMessage::Rejected {
            error: e.to_string(),
            details: Vec::new(),
        },
    }
}

/// Serialize and send; false once the client is gone
async fn send_json<T: Serialize>(socket: &mut WebSocket, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => socket.send(Message::Text(json)).await.is_ok(),
        Err(_) => true,
    }
}
