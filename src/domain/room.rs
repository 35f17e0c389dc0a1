//! Room entity, room naming rules, and the pure access decision.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::timestamp::Timestamp;

/// Room name substituted when sanitization strips the input to nothing
pub const DEFAULT_ROOM_NAME: &str = "default";

/// Maximum length of a sanitized room name
const MAX_ROOM_NAME_LEN: usize = 50;

/// A sanitized room name.
///
/// Room names are case-sensitive and restricted to `[A-Za-z0-9_-]`, at most
/// 50 characters. Construction goes through [`RoomName::sanitize`], which
/// never fails: invalid characters are stripped, the result is truncated,
/// and a fully-stripped or empty input falls back to [`DEFAULT_ROOM_NAME`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(String);

impl RoomName {
    /// Sanitize a raw room name from the client.
    pub fn sanitize(raw: &str) -> Self {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .take(MAX_ROOM_NAME_LEN)
            .collect();

        if cleaned.is_empty() {
            Self(DEFAULT_ROOM_NAME.to_string())
        } else {
            Self(cleaned)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when an account id fails validation
#[derive(Debug, Error, PartialEq, Eq)]
#[error("account id must not be empty")]
pub struct InvalidAccountId;

/// Identifier of an account in the external identity system.
///
/// Opaque to this engine; always passed explicitly rather than read from
/// ambient session state, so authorization logic stays testable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create an account id, rejecting empty or whitespace-only input
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidAccountId> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(InvalidAccountId)
        } else {
            Ok(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a room record in the external room store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(Uuid);

impl RoomId {
    /// Generate a fresh room id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Room record as read from the external store.
///
/// A room's claim is set-once: there is no re-claim or release path in this
/// engine, so `claimed_by` only ever transitions from `None` to `Some`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub name: RoomName,
    pub claimed_by: Option<AccountId>,
    pub created_at: Timestamp,
}

/// Result of evaluating a requester's access to a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomAccess {
    pub can_access: bool,
    pub is_claimed: bool,
    pub is_owner: bool,
}

/// Decide whether `requester` may view/edit a room.
///
/// A room that does not exist in the store, or exists unclaimed, is open to
/// everyone. A claimed room is accessible only to its owner; `is_owner`
/// mirrors `can_access` in that case. Pure function, no I/O.
pub fn evaluate_access(room: Option<&Room>, requester: Option<&AccountId>) -> RoomAccess {
    let owner = room.and_then(|r| r.claimed_by.as_ref());

    match owner {
        None => RoomAccess {
            can_access: true,
            is_claimed: false,
            is_owner: false,
        },
        Some(owner) => {
            let is_owner = requester.is_some_and(|requester| requester == owner);
            RoomAccess {
                can_access: is_owner,
                is_claimed: true,
                is_owner,
            }
        }
    }
}
