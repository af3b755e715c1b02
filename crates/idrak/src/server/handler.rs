//! WebSocket Connection Handler
//!
//! Drives one session per connection: a single loop owns the session and
//! multiplexes client frames with the session's background events.

use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde_json::Value;

use super::protocol::{ClientMessage, ErrorCode, ServerMessage};
use super::state::AppState;
use crate::session::{Session, SessionError};

/// Handle a WebSocket connection
pub async fn handle_websocket(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let session_id = state.register_client();
    let mut session = Session::boot(
        session_id,
        state.catalog(),
        state.store(),
        state.session_config(),
    );

    let greeting = [
        ServerMessage::connected(session_id.to_string()),
        ServerMessage::view(session.snapshot()),
    ];
    for msg in &greeting {
        if !send(&mut ws_sender, msg).await {
            state.remove_client(session_id);
            return;
        }
    }

    loop {
        tokio::select! {
            frame = ws_receiver.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(_))) => {
                        // Pong is handled automatically by axum
                        tracing::trace!("Received ping from {}", session_id);
                        continue;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket error for {}: {}", session_id, e);
                        break;
                    }
                };

                let replies = handle_client_message(&mut session, &text).await;
                if !send_all(&mut ws_sender, &replies).await {
                    break;
                }
            }
            event = session.next_event() => {
                let Some(event) = event else {
                    tracing::warn!("Session {} lost its event sources", session_id);
                    break;
                };
                if session.handle_event(event) {
                    let view = ServerMessage::view(session.snapshot());
                    if !send(&mut ws_sender, &view).await {
                        break;
                    }
                }
            }
        }
    }

    // Cleanup
    drop(session);
    state.remove_client(session_id);
}

/// Handle a client message, returning the replies in order
pub(crate) async fn handle_client_message(session: &mut Session, text: &str) -> Vec<ServerMessage> {
    let raw: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Failed to parse client message: {}", e);
            return vec![ServerMessage::error(None, ErrorCode::InvalidRequest, "Invalid JSON")];
        }
    };

    // Keep the id so malformed requests can still be correlated
    let request_id = raw.get("id").and_then(Value::as_str).map(str::to_string);

    let msg: ClientMessage = match serde_json::from_value(raw) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!("Invalid client message: {}", e);
            return vec![ServerMessage::error(
                request_id,
                ErrorCode::InvalidRequest,
                format!("Invalid request: {}", e),
            )];
        }
    };

    match msg {
        ClientMessage::Command { id, command } => {
            let response = match session.apply(command).await {
                Ok(()) => ServerMessage::success(id, None),
                Err(SessionError::Store(e)) => {
                    tracing::error!("Session {} failed to persist: {}", session.id(), e);
                    ServerMessage::failure(id, ErrorCode::StorageError, e.to_string())
                }
            };
            // The transition is kept even when persisting failed
            vec![response, ServerMessage::view(session.snapshot())]
        }
        ClientMessage::Snapshot { id } => match serde_json::to_value(session.snapshot()) {
            Ok(data) => vec![ServerMessage::success(id, Some(data))],
            Err(e) => vec![ServerMessage::failure(
                id,
                ErrorCode::InternalError,
                e.to_string(),
            )],
        },
        ClientMessage::Ping { id } => vec![ServerMessage::pong(id)],
    }
}

async fn send_all(sender: &mut SplitSink<WebSocket, Message>, messages: &[ServerMessage]) -> bool {
    for msg in messages {
        if !send(sender, msg).await {
            return false;
        }
    }
    true
}

/// Send a message, returning false once the socket is gone
async fn send(sender: &mut SplitSink<WebSocket, Message>, msg: &ServerMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            true
        }
    }
}
