//! HTTP request/response DTOs.

use serde::{Deserialize, Serialize};

use crate::common::time::timestamp_to_rfc3339;
use crate::domain::Snapshot;

/// Body of `POST /api/rooms/claim`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub room_name: String,
    pub account_id: String,
}

/// Response of `POST /api/rooms/claim`
#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub success: bool,
    pub message: String,
}

/// Response of `GET /api/rooms/{room_name}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub name: String,
    pub claimed: bool,
    pub member_count: usize,
}

/// Query parameters of `GET /api/rooms/{room_name}/history`
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub account_id: Option<String>,
}

/// One history entry in `GET /api/rooms/{room_name}/history`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDto {
    pub author: String,
    pub text: String,
    pub created_at: String,
}

impl From<Snapshot> for SnapshotDto {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            author: snapshot.author.as_str().to_string(),
            text: snapshot.text,
            created_at: timestamp_to_rfc3339(snapshot.created_at.value()),
        }
    }
}

/// Response of `GET /api/rooms/{room_name}/history`
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<SnapshotDto>,
}
