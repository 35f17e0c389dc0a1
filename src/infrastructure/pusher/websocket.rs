//! WebSocket-backed [`PeerSender`] implementation.
//!
//! The WebSocket itself is created in the UI layer
//! (`src/ui/handler/websocket.rs`); this implementation receives each
//! connection's `UnboundedSender` and uses it for delivery. Creating the
//! socket and sending on it stay separated: the UI layer accepts the
//! connection and produces the sender, this layer owns the sender map.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, PeerChannel, PeerSender, PushError};

/// Peer sender backed by the per-connection WebSocket channels.
pub struct WebSocketPeerSender {
    /// Outbound channel per live connection
    connections: Arc<Mutex<HashMap<ConnectionId, PeerChannel>>>,
}

impl WebSocketPeerSender {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for WebSocketPeerSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PeerSender for WebSocketPeerSender {
    async fn register(&self, connection_id: ConnectionId, channel: PeerChannel) {
        let mut connections = self.connections.lock().await;
        connections.insert(connection_id, channel);
        tracing::debug!("Connection '{}' registered to peer sender", connection_id);
    }

    async fn unregister(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        connections.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from peer sender",
            connection_id
        );
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        payload: &str,
    ) -> Result<(), PushError> {
        let connections = self.connections.lock().await;

        if let Some(sender) = connections.get(connection_id) {
            sender
                .send(payload.to_string())
                .map_err(|e| PushError::PushFailed(e.to_string()))?;
            Ok(())
        } else {
            Err(PushError::ConnectionNotFound(*connection_id))
        }
    }

    async fn broadcast(&self, targets: &[ConnectionId], payload: &str) {
        let connections = self.connections.lock().await;

        for target in targets {
            if let Some(sender) = connections.get(target) {
                // A peer that disconnected mid-fan-out just misses the event
                if let Err(e) = sender.send(payload.to_string()) {
                    tracing::warn!("Failed to push to connection '{}': {}", target, e);
                }
            } else {
                tracing::warn!("Connection '{}' not found during broadcast, skipping", target);
            }
        }
    }
}
