//! WebSocket transport for the Editing Session protocol.
//!
//! Each connection gets a writer task that drains its registry queue into
//! the socket and a reader loop that feeds text frames to one
//! [`EditingSession`], strictly one message at a time.

use std::sync::Arc;

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use darkroom_core::ImageBackend;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;

use crate::protocol::ServerMessage;
use crate::registry::{ConnectionId, SessionRegistry};
use crate::server::AppState;
use crate::session::EditingSession;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.max_message_size(state.config.max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (connection_id, rx) = state.registry.register();
    tracing::info!(connection_id = %connection_id, "websocket client connected");

    let (ws_tx, ws_rx) = socket.split();
    let writer = tokio::spawn(write_loop(ws_tx, rx, connection_id.clone()));

    run_session(
        &connection_id,
        ws_rx,
        Arc::clone(&state.backend),
        &state.registry,
    )
    .await;

    // Dropping the registry's sender lets the writer drain what is queued
    // and then stop.
    state.registry.unregister(&connection_id);
    let _ = writer.await;
    tracing::info!(connection_id = %connection_id, "websocket client disconnected");
}

/// Forward queued replies to the socket until the queue closes or the peer
/// goes away.
async fn write_loop<S>(mut sink: S, mut rx: mpsc::Receiver<ServerMessage>, id: ConnectionId)
where
    S: Sink<WsMessage> + Unpin,
{
    while let Some(message) = rx.recv().await {
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(err) => {
                tracing::error!(connection_id = %id, error = %err, "failed to serialize reply");
                continue;
            }
        };
        if sink.send(WsMessage::Text(json.into())).await.is_err() {
            tracing::debug!(connection_id = %id, "socket closed while writing");
            break;
        }
    }
    let _ = sink.close().await;
}

/// Drive one session from incoming frames until the peer closes, the
/// stream errors, or a reply can no longer be delivered.
///
/// The session, and the original image it holds, is dropped on return.
pub async fn run_session<B, S, E>(
    id: &ConnectionId,
    mut frames: S,
    backend: Arc<B>,
    registry: &SessionRegistry,
) where
    B: ImageBackend + 'static,
    S: Stream<Item = Result<WsMessage, E>> + Unpin,
    E: std::fmt::Display,
{
    let mut session = EditingSession::new(backend);

    while let Some(frame) = frames.next().await {
        let text = match frame {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => continue,
            Err(err) => {
                tracing::debug!(connection_id = %id, error = %err, "websocket read failed");
                break;
            }
        };
        tracing::debug!(connection_id = %id, bytes = text.as_str().len(), "message received");

        let worker = tokio::task::spawn_blocking(move || {
            let reply = session.handle_text(text.as_str());
            (session, reply)
        });
        let reply = match worker.await {
            Ok((returned, reply)) => {
                session = returned;
                reply
            }
            Err(err) => {
                tracing::error!(connection_id = %id, error = %err, "session worker failed");
                return;
            }
        };
        let Some(reply) = reply else { break };

        let kind = reply.kind();
        if let Err(err) = registry.send(id, reply).await {
            tracing::warn!(connection_id = %id, message_type = kind, error = %err, "reply not delivered, closing session");
            break;
        }
        tracing::debug!(connection_id = %id, message_type = kind, "reply queued");
    }

    session.close();
}
