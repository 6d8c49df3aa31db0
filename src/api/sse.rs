//! Server-sent events stream of newly stored entries

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream, StreamExt};

use super::state::AppState;
use super::websocket::events::ServerMessage;
use crate::live::Received;

/// GET /api/logs/stream - SSE stream of live entries
pub async fn live_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.feed.subscribe();

    let connected = ServerMessage::Connected {
        current_sequence_id: state.current_sequence_id(),
    };
    let welcome = stream::once(async move {
        let event = Event::default()
            .event("connected")
            .data(serde_json::to_string(&connected).unwrap_or_default());
        Ok::<_, Infallible>(event)
    });

    let updates = subscription.into_stream().map(|received| {
        let event = match received {
            Received::Message(msg) => Event::default()
                .event("log_created")
                .data(serde_json::to_string(&msg).unwrap_or_default()),
            Received::Lagged(n) => {
                // Client is too slow
                let error = ServerMessage::error(
                    "lagged",
                    format!("Missed {} log entries, please reconnect", n),
                );
                Event::default()
                    .event("error")
                    .data(serde_json::to_string(&error).unwrap_or_default())
            }
        };
        Ok::<_, Infallible>(event)
    });

    Sse::new(welcome.chain(updates))
        .keep_alive(KeepAlive::default().interval(Duration::from_secs(30)))
}
