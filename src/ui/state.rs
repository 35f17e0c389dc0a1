//! Shared application state for handlers.

use std::sync::Arc;

use crate::domain::{HistoryStore, PeerSender, RoomStore};
use crate::usecase::{ClaimRoomUseCase, ConnectionRegistry, HistorySnapshotWriter, TextBroadcaster};

/// Shared application state
pub struct AppState {
    /// Live connections grouped by room
    pub registry: Arc<ConnectionRegistry>,
    /// Text fan-out to room peers
    pub broadcaster: Arc<TextBroadcaster>,
    /// Debounced history persistence
    pub snapshots: Arc<HistorySnapshotWriter>,
    /// Room ownership assignment
    pub claim: Arc<ClaimRoomUseCase>,
    /// Room store (data access abstraction)
    pub rooms: Arc<dyn RoomStore>,
    /// History store (data access abstraction)
    pub history: Arc<dyn HistoryStore>,
    /// Peer delivery (transport abstraction)
    pub pusher: Arc<dyn PeerSender>,
}
