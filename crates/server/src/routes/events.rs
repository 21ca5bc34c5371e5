//! Real-time invalidation channel.
//!
//! A single endpoint upgraded to a persistent WebSocket. The traffic is
//! server-to-client only: `{"type":"hello"}` on connect, then every event
//! broadcast by mutation handlers. There is no replay and no subscription
//! filter; a client that connects late catches up with its own initial
//! fetch.

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::instrument;

use voltstore_core::ChangeEvent;

use crate::state::AppState;

/// Invalidation channel routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ws", get(upgrade))
}

/// Upgrade the connection and start fanning out events.
#[instrument(skip(state, ws))]
async fn upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| serve_events(socket, state))
}

/// Pump broadcast events into one client's socket until either side closes.
async fn serve_events(mut socket: WebSocket, state: AppState) {
    let mut events = state.subscribe();

    if send_event(&mut socket, ChangeEvent::Hello).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if send_event(&mut socket, event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    // At-most-once: a slow client simply misses events.
                    tracing::debug!(missed, "client lagged behind the event buffer");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                // The channel is server-to-client only; inbound frames are
                // drained and ignored.
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: ChangeEvent) -> Result<(), axum::Error> {
    let Ok(payload) = serde_json::to_string(&event) else {
        return Ok(());
    };
    socket.send(Message::Text(payload.into())).await
}
