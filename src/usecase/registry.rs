//! Authoritative table of live connections grouped by room.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, PeerSender, RoomName};
use crate::infrastructure::dto::websocket::ServerEvent;

/// Membership tables, mutated only while the registry lock is held.
///
/// Invariant: `memberships` is the exact inverse of `rooms` — a connection
/// appears in `rooms[r]` iff `memberships[c] == r`. Counts are derived from
/// set cardinality, so they can never go negative or drift.
#[derive(Default)]
struct RegistryInner {
    /// room name -> members
    rooms: HashMap<RoomName, HashSet<ConnectionId>>,
    /// connection -> the one room it currently occupies
    memberships: HashMap<ConnectionId, RoomName>,
}

impl RegistryInner {
    /// Remove a connection from its current room, if any.
    /// Returns the departed room and its remaining members.
    fn remove(&mut self, connection_id: &ConnectionId) -> Option<(RoomName, Vec<ConnectionId>)> {
        let room = self.memberships.remove(connection_id)?;
        let members = self.rooms.get_mut(&room)?;
        members.remove(connection_id);
        let remaining: Vec<ConnectionId> = members.iter().copied().collect();
        // stale empty entries are harmless; garbage-collect them anyway
        if members.is_empty() {
            self.rooms.remove(&room);
        }
        Some((room, remaining))
    }

    fn insert(&mut self, connection_id: ConnectionId, room: RoomName) -> Vec<ConnectionId> {
        self.memberships.insert(connection_id, room.clone());
        let members = self.rooms.entry(room).or_default();
        members.insert(connection_id);
        members.iter().copied().collect()
    }
}

/// Registry of live connections per room.
///
/// All membership mutations for a room go through the single registry lock,
/// so a join/leave pair is atomic with respect to concurrent joins/leaves on
/// the same room. Count announcements are emitted after the lock is
/// released; the member lists they are sent to are captured under the lock.
pub struct ConnectionRegistry {
    inner: Mutex<RegistryInner>,
    pusher: Arc<dyn PeerSender>,
}

impl ConnectionRegistry {
    pub fn new(pusher: Arc<dyn PeerSender>) -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
            pusher,
        }
    }

    /// Place a connection into the room named by `raw_room_name`
    /// (sanitized), removing it from its previous room first — a connection
    /// is a member of at most one room at any instant.
    ///
    /// Announces the updated member count to the new room (including the
    /// joiner) and, if the connection moved, to the departed room's
    /// remaining members. Returns the sanitized room name.
    pub async fn join(&self, connection_id: ConnectionId, raw_room_name: &str) -> RoomName {
        let room = RoomName::sanitize(raw_room_name);

        let (departed, members) = {
            let mut inner = self.inner.lock().await;
            let departed = inner.remove(&connection_id);
            let members = inner.insert(connection_id, room.clone());
            (departed, members)
        };

        if let Some((old_room, remaining)) = departed {
            tracing::debug!(
                "Connection '{}' left room '{}' for '{}'",
                connection_id,
                old_room,
                room
            );
            self.announce_count(&remaining).await;
        }

        tracing::info!("Connection '{}' joined room '{}'", connection_id, room);
        self.announce_count(&members).await;

        room
    }

    /// Remove a connection from whatever room it currently occupies and
    /// announce the updated count to the remaining members.
    ///
    /// Idempotent: a connection that is not a member of any room is a no-op.
    pub async fn leave(&self, connection_id: &ConnectionId) {
        let departed = {
            let mut inner = self.inner.lock().await;
            inner.remove(connection_id)
        };

        if let Some((room, remaining)) = departed {
            tracing::info!("Connection '{}' left room '{}'", connection_id, room);
            self.announce_count(&remaining).await;
        }
    }

    /// Current member count of a room. Unknown rooms are zero-member rooms.
    pub async fn member_count(&self, room: &RoomName) -> usize {
        let inner = self.inner.lock().await;
        inner.rooms.get(room).map_or(0, |members| members.len())
    }

    /// Snapshot of a room's current members
    pub async fn members_of(&self, room: &RoomName) -> Vec<ConnectionId> {
        let inner = self.inner.lock().await;
        inner
            .rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    async fn announce_count(&self, members: &[ConnectionId]) {
        let event = ServerEvent::ClientCount {
            count: members.len() as u32,
        };
        self.pusher.broadcast(members, &event.to_json()).await;
    }
}
