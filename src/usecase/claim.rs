//! One-time room ownership assignment.

use std::sync::Arc;

use crate::common::time::Clock;
use crate::domain::{AccountId, ClaimOutcome, IdentityProvider, RoomName, RoomStore, StoreError, Timestamp};

/// Outcome of a claim attempt, reported to the request/response path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimDecision {
    /// The claimant now owns the room
    Claimed,
    /// Another account got there first — a normal outcome, not a fault
    AlreadyClaimed,
    /// The claimant's account has not completed verification
    Unverified,
}

/// Claim a room for a verified account.
///
/// The claim itself is delegated to the store as a single conditional
/// update ("set owner only if currently unset"), never a read-then-write
/// from here, so concurrent claimants resolve to exactly one winner.
pub struct ClaimRoomUseCase {
    rooms: Arc<dyn RoomStore>,
    identities: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
}

impl ClaimRoomUseCase {
    pub fn new(
        rooms: Arc<dyn RoomStore>,
        identities: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            identities,
            clock,
        }
    }

    pub async fn execute(
        &self,
        raw_room_name: &str,
        claimant: AccountId,
    ) -> Result<ClaimDecision, StoreError> {
        if !self.identities.is_verified(&claimant).await {
            tracing::info!("Unverified account '{}' attempted a claim", claimant);
            return Ok(ClaimDecision::Unverified);
        }

        let name = RoomName::sanitize(raw_room_name);
        let at = Timestamp::new(self.clock.now_millis());

        match self.rooms.claim(&name, claimant.clone(), at).await? {
            ClaimOutcome::Claimed => {
                tracing::info!("Room '{}' claimed by '{}'", name, claimant);
                Ok(ClaimDecision::Claimed)
            }
            ClaimOutcome::AlreadyClaimed => Ok(ClaimDecision::AlreadyClaimed),
        }
    }
}
