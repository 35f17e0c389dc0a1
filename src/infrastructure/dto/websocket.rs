//! WebSocket event DTOs.
//!
//! Events are logical messages tagged by `type`; the tag values and field
//! names match the browser client (`join-room`, `text-update`,
//! `room-status`, `client-count`).

use serde::{Deserialize, Serialize};

/// Events a client sends to the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Join (or switch to) a room; the name is sanitized server-side
    JoinRoom { room: String },
    /// Replace the room's live text with `text`
    TextUpdate { text: String },
}

/// Events the server sends to a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Claim/access status for the room just joined, sent to the joiner only
    #[serde(rename_all = "camelCase")]
    RoomStatus {
        claimed: bool,
        can_access: bool,
        last_text: String,
    },
    /// Current member count of the room, sent to every member
    ClientCount { count: u32 },
    /// A peer's text mutation, sent to every member except the origin
    TextUpdate { text: String },
}

impl ServerEvent {
    /// Serialize to the wire encoding.
    ///
    /// These enums contain only strings, bools and integers; serialization
    /// cannot fail.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("server event serializes")
    }
}
