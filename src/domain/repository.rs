//! Store and identity traits the core engine consumes.
//!
//! The engine does not own durable storage for rooms or history; it talks to
//! collaborator stores through these traits. The UseCase layer depends on
//! the traits only, never on a concrete backend (dependency inversion).

use async_trait::async_trait;
use thiserror::Error;

use super::room::{AccountId, Room, RoomId, RoomName};
use super::snapshot::Snapshot;
use super::timestamp::Timestamp;

/// Errors surfaced by the collaborator stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Result of a claim compare-and-set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The caller is now the room's owner
    Claimed,
    /// Another account already owns the room
    AlreadyClaimed,
}

/// Room store interface.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Look up a room by its sanitized name. Unknown names are `None`,
    /// not an error.
    async fn find_by_name(&self, name: &RoomName) -> Result<Option<Room>, StoreError>;

    /// Atomically assign `owner` to the room named `name`, creating the
    /// room if absent, but only if it is currently unclaimed.
    ///
    /// This is a compare-and-set at the store boundary: under concurrent
    /// claims on the same room, exactly one caller observes
    /// [`ClaimOutcome::Claimed`].
    async fn claim(
        &self,
        name: &RoomName,
        owner: AccountId,
        at: Timestamp,
    ) -> Result<ClaimOutcome, StoreError>;
}

/// Append-only history store interface.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a snapshot for a room
    async fn append(
        &self,
        room_id: RoomId,
        author: AccountId,
        text: String,
        at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Most recently created snapshot for a room, if any
    async fn latest(&self, room_id: &RoomId) -> Result<Option<Snapshot>, StoreError>;

    /// Up to `limit` snapshots for a room, newest first
    async fn recent(&self, room_id: &RoomId, limit: usize) -> Result<Vec<Snapshot>, StoreError>;
}

/// Identity verification interface.
///
/// Credential issuance and verification flows live outside this engine;
/// the only question the engine ever asks is whether an account has
/// completed verification (a prerequisite for claiming a room).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn is_verified(&self, account: &AccountId) -> bool;
}
