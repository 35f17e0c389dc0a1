//! Per-connection session state machine.

use std::sync::Arc;

use crate::domain::{
    AccountId, ConnectionId, HistoryStore, PeerSender, RoomName, RoomStore, evaluate_access,
};
use crate::infrastructure::dto::websocket::ServerEvent;
use crate::usecase::{ConnectionRegistry, HistorySnapshotWriter, TextBroadcaster};

/// Session lifecycle: `Unjoined → Joined → Left` (terminal).
///
/// A session may re-join (Joined → Joined with a different room); once Left,
/// all further events are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unjoined,
    Joined(RoomName),
    Left,
}

/// Coordinates registry, broadcaster and snapshot writer for one connection.
///
/// The session's identity is fixed at connect time and passed explicitly
/// into every access/persistence decision. Access denial on a claimed room
/// is advisory: the denied session stays joined for membership-count
/// purposes until it disconnects or joins elsewhere.
pub struct RoomSession {
    connection_id: ConnectionId,
    identity: Option<AccountId>,
    state: SessionState,
    registry: Arc<ConnectionRegistry>,
    broadcaster: Arc<TextBroadcaster>,
    snapshots: Arc<HistorySnapshotWriter>,
    rooms: Arc<dyn RoomStore>,
    history: Arc<dyn HistoryStore>,
    pusher: Arc<dyn PeerSender>,
}

impl RoomSession {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connection_id: ConnectionId,
        identity: Option<AccountId>,
        registry: Arc<ConnectionRegistry>,
        broadcaster: Arc<TextBroadcaster>,
        snapshots: Arc<HistorySnapshotWriter>,
        rooms: Arc<dyn RoomStore>,
        history: Arc<dyn HistoryStore>,
        pusher: Arc<dyn PeerSender>,
    ) -> Self {
        Self {
            connection_id,
            identity,
            state: SessionState::Unjoined,
            registry,
            broadcaster,
            snapshots,
            rooms,
            history,
            pusher,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_room(&self) -> Option<&RoomName> {
        match &self.state {
            SessionState::Joined(room) => Some(room),
            _ => None,
        }
    }

    /// Handle a join request: register with the room, evaluate access, and
    /// send the room-status message to this connection only.
    pub async fn join(&mut self, raw_room_name: &str) {
        if self.state == SessionState::Left {
            tracing::debug!(
                "Ignoring join from departed connection '{}'",
                self.connection_id
            );
            return;
        }

        let room = self.registry.join(self.connection_id, raw_room_name).await;
        let status = self.room_status(&room).await;

        if let Err(e) = self.pusher.push_to(&self.connection_id, &status.to_json()).await {
            tracing::warn!(
                "Failed to send room status to '{}': {}",
                self.connection_id,
                e
            );
        }

        self.state = SessionState::Joined(room);
    }

    /// Handle a text-update event.
    ///
    /// Always re-broadcasts to room peers — broadcast is not access-gated
    /// beyond the initial room-status check — and always offers the edit to
    /// the snapshot writer, which re-checks ownership before persisting.
    pub async fn edit(&self, text: &str) {
        let SessionState::Joined(room) = &self.state else {
            // stray event from an unjoined or departed connection
            return;
        };

        self.broadcaster
            .publish(room, &self.connection_id, text)
            .await;
        self.snapshots
            .on_edit(&self.connection_id, room, self.identity.as_ref(), text)
            .await;
    }

    /// Handle transport disconnect: deregister and abandon any pending
    /// snapshot timer. Terminal; safe to call more than once.
    pub async fn disconnect(&mut self) {
        if self.state == SessionState::Left {
            return;
        }

        self.registry.leave(&self.connection_id).await;
        self.snapshots.cancel(&self.connection_id).await;
        self.state = SessionState::Left;
    }

    /// Build the room-status message for a freshly joined room.
    ///
    /// `last_text` is recovered from the latest history snapshot only when
    /// the room is claimed and this session may access it; in every other
    /// case the joiner starts from an empty buffer. Store failures degrade
    /// to an open, empty status rather than disturbing the session.
    async fn room_status(&self, room_name: &RoomName) -> ServerEvent {
        let room = match self.rooms.find_by_name(room_name).await {
            Ok(room) => room,
            Err(e) => {
                tracing::warn!("Error checking room status for '{}': {}", room_name, e);
                None
            }
        };

        let access = evaluate_access(room.as_ref(), self.identity.as_ref());

        let mut last_text = String::new();
        if access.is_claimed && access.can_access {
            if let Some(room) = &room {
                match self.history.latest(&room.id).await {
                    Ok(Some(snapshot)) => last_text = snapshot.text,
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!("Error loading latest snapshot for '{}': {}", room_name, e);
                    }
                }
            }
        }

        ServerEvent::RoomStatus {
            claimed: access.is_claimed,
            can_access: access.can_access,
            last_text,
        }
    }
}
