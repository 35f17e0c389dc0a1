//! History snapshot entity.

use super::room::{AccountId, RoomId};
use super::timestamp::Timestamp;

/// A persisted copy of a room's text at a point in time.
///
/// Appended only by the room's verified owner, never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub room_id: RoomId,
    pub author: AccountId,
    pub text: String,
    pub created_at: Timestamp,
}
