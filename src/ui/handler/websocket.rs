//! WebSocket connection handler.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::domain::{AccountId, ConnectionId, PeerSender};
use crate::infrastructure::dto::websocket::ClientEvent;
use crate::ui::state::AppState;
use crate::usecase::RoomSession;

/// Query parameters for WebSocket connection.
///
/// `account` carries the authenticated account id, if any. Identity is an
/// explicit parameter here rather than ambient session state; verifying it
/// belongs to the surrounding application.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub account: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    let identity = query
        .account
        .and_then(|account| AccountId::new(account).ok());
    let connection_id = ConnectionId::new();

    tracing::info!("New client connected: {}", connection_id);
    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id, identity))
}

/// Spawns a task that receives payloads from the rx channel and writes them
/// to this connection's WebSocket sink.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    identity: Option<AccountId>,
) {
    let (sender, mut receiver) = socket.split();

    // Register the outbound channel before any event can be produced for
    // this connection, then drive it from its own task.
    let (tx, rx) = mpsc::unbounded_channel();
    state.pusher.register(connection_id, tx).await;
    let mut send_task = pusher_loop(rx, sender);

    let mut session = RoomSession::new(
        connection_id,
        identity,
        state.registry.clone(),
        state.broadcaster.clone(),
        state.snapshots.clone(),
        state.rooms.clone(),
        state.history.clone(),
        state.pusher.clone(),
    );

    // Inbound loop. Ends when the client closes, the transport errors, or
    // the outbound task dies (client sink gone).
    loop {
        tokio::select! {
            maybe_msg = receiver.next() => {
                let msg = match maybe_msg {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error on '{}': {}", connection_id, e);
                        break;
                    }
                    None => break,
                };

                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(ClientEvent::JoinRoom { room }) => {
                            session.join(&room).await;
                        }
                        Ok(ClientEvent::TextUpdate { text }) => {
                            session.edit(&text).await;
                        }
                        Err(e) => {
                            // input errors are logged and ignored, never fatal
                            tracing::warn!(
                                "Malformed event from '{}': {}",
                                connection_id,
                                e
                            );
                        }
                    },
                    Message::Ping(_) => {
                        tracing::debug!("Received ping from '{}'", connection_id);
                        // Ping/pong is handled automatically by the WebSocket protocol
                    }
                    Message::Close(_) => {
                        tracing::info!("Client '{}' requested close", connection_id);
                        break;
                    }
                    _ => {}
                }
            }
            _ = &mut send_task => break,
        }
    }

    send_task.abort();
    session.disconnect().await;
    state.pusher.unregister(&connection_id).await;
    tracing::info!("Client disconnected: {}", connection_id);
}
