//! Peer delivery trait.
//!
//! Delivery to a connection is decoupled from the transport: the engine
//! hands a serialized event to a [`PeerSender`], and the transport layer
//! (WebSocket) owns the actual socket write. Delivery is best-effort and
//! fire-and-forget; a disconnected peer simply misses the event.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::connection::ConnectionId;

/// Outbound channel for one connection
pub type PeerChannel = mpsc::UnboundedSender<String>;

/// Errors surfaced by peer delivery
#[derive(Debug, Error)]
pub enum PushError {
    #[error("connection '{0}' not registered")]
    ConnectionNotFound(ConnectionId),
    #[error("push failed: {0}")]
    PushFailed(String),
}

/// Delivery interface from the engine to live connections.
#[async_trait]
pub trait PeerSender: Send + Sync {
    /// Register a connection's outbound channel
    async fn register(&self, connection_id: ConnectionId, channel: PeerChannel);

    /// Drop a connection's outbound channel
    async fn unregister(&self, connection_id: &ConnectionId);

    /// Send a payload to a single connection
    async fn push_to(&self, connection_id: &ConnectionId, payload: &str) -> Result<(), PushError>;

    /// Send a payload to each target, best-effort.
    ///
    /// Per-target failures are logged and skipped; fan-out never aborts
    /// part-way because one peer went away.
    async fn broadcast(&self, targets: &[ConnectionId], payload: &str);
}
