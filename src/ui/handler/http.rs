//! HTTP handlers: health, claim, room summary, history.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::domain::{AccountId, HistoryStore, RoomName, RoomStore, evaluate_access};
use crate::infrastructure::dto::http::{
    ClaimRequest, ClaimResponse, HistoryQuery, HistoryResponse, RoomSummaryDto, SnapshotDto,
};
use crate::ui::state::AppState;
use crate::usecase::ClaimDecision;

/// Snapshots shown per history request
const HISTORY_LIMIT: usize = 20;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Claim a room for a verified account.
///
/// `200` on success, `400` when the room is already claimed, `401` without
/// a usable account id, `403` for unverified accounts, `500` on store
/// failure. A losing claim race is a normal outcome, reported as
/// "already claimed".
pub async fn claim_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClaimRequest>,
) -> (StatusCode, Json<ClaimResponse>) {
    let Ok(account) = AccountId::new(request.account_id) else {
        return respond(StatusCode::UNAUTHORIZED, false, "Authentication required");
    };

    match state.claim.execute(&request.room_name, account).await {
        Ok(ClaimDecision::Claimed) => respond(StatusCode::OK, true, "Room claimed successfully"),
        Ok(ClaimDecision::AlreadyClaimed) => {
            respond(StatusCode::BAD_REQUEST, false, "Room already claimed")
        }
        Ok(ClaimDecision::Unverified) => {
            respond(StatusCode::FORBIDDEN, false, "Email verification required")
        }
        Err(e) => {
            tracing::error!("Room claim error: {}", e);
            respond(StatusCode::INTERNAL_SERVER_ERROR, false, "Server error")
        }
    }
}

/// Room status summary for the landing page.
///
/// Unknown rooms report `claimed: false` with a zero member count.
pub async fn get_room_summary(
    State(state): State<Arc<AppState>>,
    Path(room_name): Path<String>,
) -> Result<Json<RoomSummaryDto>, StatusCode> {
    let name = RoomName::sanitize(&room_name);

    let room = state.rooms.find_by_name(&name).await.map_err(|e| {
        tracing::error!("Room lookup error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let claimed = room.is_some_and(|r| r.claimed_by.is_some());
    let member_count = state.registry.member_count(&name).await;

    Ok(Json(RoomSummaryDto {
        name: name.as_str().to_string(),
        claimed,
        member_count,
    }))
}

/// Recent history snapshots for a room, newest first, owner only.
pub async fn get_room_history(
    State(state): State<Arc<AppState>>,
    Path(room_name): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, StatusCode> {
    let account = query
        .account_id
        .and_then(|account| AccountId::new(account).ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let name = RoomName::sanitize(&room_name);
    let room = state
        .rooms
        .find_by_name(&name)
        .await
        .map_err(|e| {
            tracing::error!("Room lookup error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let access = evaluate_access(Some(&room), Some(&account));
    if !access.is_owner {
        return Err(StatusCode::FORBIDDEN);
    }

    let snapshots = state
        .history
        .recent(&room.id, HISTORY_LIMIT)
        .await
        .map_err(|e| {
            tracing::error!("History lookup error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(HistoryResponse {
        success: true,
        history: snapshots.into_iter().map(SnapshotDto::from).collect(),
    }))
}

fn respond(status: StatusCode, success: bool, message: &str) -> (StatusCode, Json<ClaimResponse>) {
    (
        status,
        Json(ClaimResponse {
            success,
            message: message.to_string(),
        }),
    )
}
