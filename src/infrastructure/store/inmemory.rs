//! In-memory store implementations.
//!
//! These stand in for the durable room/history/account collections behind
//! the domain traits. The claim operation holds the room map lock for the
//! whole check-and-assign, so it is a true compare-and-set: two concurrent
//! claims on the same room serialize, and exactly one wins.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    AccountId, ClaimOutcome, HistoryStore, IdentityProvider, Room, RoomId, RoomName, RoomStore,
    Snapshot, StoreError, Timestamp,
};

/// In-memory [`RoomStore`], keyed by sanitized room name.
pub struct InMemoryRoomStore {
    rooms: Arc<Mutex<HashMap<RoomName, Room>>>,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryRoomStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn find_by_name(&self, name: &RoomName) -> Result<Option<Room>, StoreError> {
        let rooms = self.rooms.lock().await;
        Ok(rooms.get(name).cloned())
    }

    async fn claim(
        &self,
        name: &RoomName,
        owner: AccountId,
        at: Timestamp,
    ) -> Result<ClaimOutcome, StoreError> {
        let mut rooms = self.rooms.lock().await;

        match rooms.get_mut(name) {
            Some(room) if room.claimed_by.is_some() => Ok(ClaimOutcome::AlreadyClaimed),
            Some(room) => {
                room.claimed_by = Some(owner);
                Ok(ClaimOutcome::Claimed)
            }
            None => {
                rooms.insert(
                    name.clone(),
                    Room {
                        id: RoomId::new(),
                        name: name.clone(),
                        claimed_by: Some(owner),
                        created_at: at,
                    },
                );
                Ok(ClaimOutcome::Claimed)
            }
        }
    }
}

/// In-memory append-only [`HistoryStore`].
pub struct InMemoryHistoryStore {
    /// Snapshots in append order; append order equals creation order here
    snapshots: Arc<Mutex<Vec<Snapshot>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Total number of stored snapshots across all rooms (test helper)
    pub async fn len(&self) -> usize {
        self.snapshots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(
        &self,
        room_id: RoomId,
        author: AccountId,
        text: String,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.lock().await;
        snapshots.push(Snapshot {
            room_id,
            author,
            text,
            created_at: at,
        });
        Ok(())
    }

    async fn latest(&self, room_id: &RoomId) -> Result<Option<Snapshot>, StoreError> {
        let snapshots = self.snapshots.lock().await;
        Ok(snapshots
            .iter()
            .rev()
            .find(|s| s.room_id == *room_id)
            .cloned())
    }

    async fn recent(&self, room_id: &RoomId, limit: usize) -> Result<Vec<Snapshot>, StoreError> {
        let snapshots = self.snapshots.lock().await;
        Ok(snapshots
            .iter()
            .rev()
            .filter(|s| s.room_id == *room_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// In-memory [`IdentityProvider`] holding the set of verified accounts.
pub struct InMemoryIdentityProvider {
    verified: Arc<Mutex<HashSet<AccountId>>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self {
            verified: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Mark an account as verified
    pub async fn add_verified(&self, account: AccountId) {
        let mut verified = self.verified.lock().await;
        verified.insert(account);
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn is_verified(&self, account: &AccountId) -> bool {
        let verified = self.verified.lock().await;
        verified.contains(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str) -> AccountId {
        AccountId::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_find_unknown_room_returns_none() {
        // given:
        let store = InMemoryRoomStore::new();

        // when:
        let found = store
            .find_by_name(&RoomName::sanitize("nowhere"))
            .await
            .unwrap();

        // then:
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_claim_creates_room_when_absent() {
        // given:
        let store = InMemoryRoomStore::new();
        let name = RoomName::sanitize("fresh");

        // when:
        let outcome = store
            .claim(&name, account("alice"), Timestamp::new(1))
            .await
            .unwrap();

        // then:
        assert_eq!(outcome, ClaimOutcome::Claimed);
        let room = store.find_by_name(&name).await.unwrap().unwrap();
        assert_eq!(room.claimed_by, Some(account("alice")));
    }

    #[tokio::test]
    async fn test_second_claim_is_rejected() {
        // given:
        let store = InMemoryRoomStore::new();
        let name = RoomName::sanitize("fresh");
        store
            .claim(&name, account("alice"), Timestamp::new(1))
            .await
            .unwrap();

        // when:
        let outcome = store
            .claim(&name, account("bob"), Timestamp::new(2))
            .await
            .unwrap();

        // then: owner unchanged
        assert_eq!(outcome, ClaimOutcome::AlreadyClaimed);
        let room = store.find_by_name(&name).await.unwrap().unwrap();
        assert_eq!(room.claimed_by, Some(account("alice")));
    }

    #[tokio::test]
    async fn test_concurrent_claims_have_exactly_one_winner() {
        // given:
        let store = Arc::new(InMemoryRoomStore::new());
        let name = RoomName::sanitize("contested");

        // when: two claimants race on the same unclaimed room
        let (a, b) = tokio::join!(
            store.claim(&name, account("alice"), Timestamp::new(1)),
            store.claim(&name, account("bob"), Timestamp::new(1)),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        // then: exactly one Claimed, and the final owner is the winner
        assert_ne!(a, b);
        let winner = if a == ClaimOutcome::Claimed {
            account("alice")
        } else {
            account("bob")
        };
        let room = store.find_by_name(&name).await.unwrap().unwrap();
        assert_eq!(room.claimed_by, Some(winner));
    }

    #[tokio::test]
    async fn test_latest_returns_most_recent_snapshot() {
        // given:
        let store = InMemoryHistoryStore::new();
        let room_id = RoomId::new();
        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            store
                .append(
                    room_id,
                    account("alice"),
                    text.to_string(),
                    Timestamp::new(i as i64),
                )
                .await
                .unwrap();
        }

        // when:
        let latest = store.latest(&room_id).await.unwrap().unwrap();

        // then:
        assert_eq!(latest.text, "three");
    }

    #[tokio::test]
    async fn test_latest_ignores_other_rooms() {
        // given:
        let store = InMemoryHistoryStore::new();
        let mine = RoomId::new();
        let other = RoomId::new();
        store
            .append(other, account("bob"), "elsewhere".to_string(), Timestamp::new(1))
            .await
            .unwrap();

        // when / then:
        assert!(store.latest(&mine).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_bounded() {
        // given:
        let store = InMemoryHistoryStore::new();
        let room_id = RoomId::new();
        for i in 0..30 {
            store
                .append(
                    room_id,
                    account("alice"),
                    format!("rev {i}"),
                    Timestamp::new(i),
                )
                .await
                .unwrap();
        }

        // when:
        let recent = store.recent(&room_id, 20).await.unwrap();

        // then:
        assert_eq!(recent.len(), 20);
        assert_eq!(recent[0].text, "rev 29");
        assert_eq!(recent[19].text, "rev 10");
    }

    #[tokio::test]
    async fn test_identity_provider_verification() {
        // given:
        let identities = InMemoryIdentityProvider::new();
        identities.add_verified(account("alice")).await;

        // when / then:
        assert!(identities.is_verified(&account("alice")).await);
        assert!(!identities.is_verified(&account("bob")).await);
    }
}
