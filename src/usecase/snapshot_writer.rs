//! Debounced persistence of room text to the history store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::common::time::Clock;
use crate::domain::{AccountId, ConnectionId, HistoryStore, RoomId, RoomName, RoomStore, Timestamp};

/// Quiet interval after the last edit before a snapshot is persisted
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

/// A scheduled write, replaced (not stacked) on every new edit.
///
/// The generation tag lets a fired timer clear its own map entry without
/// clobbering a newer timer that replaced it.
struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Persists at most one history snapshot per burst of edits.
///
/// Only the owner's edits in a claimed room are recorded; ownership is
/// re-read from the room store on every edit. The debounce is trailing:
/// each edit cancels the previous pending write and schedules a new one, so
/// the snapshot that eventually fires carries the quiescent final text.
///
/// Persistence failures are logged and swallowed; they never reach the
/// editing session. A pending timer abandoned at disconnect is an accepted
/// data-loss window: the final keystroke before a disconnect may never be
/// persisted.
pub struct HistorySnapshotWriter {
    rooms: Arc<dyn RoomStore>,
    history: Arc<dyn HistoryStore>,
    clock: Arc<dyn Clock>,
    debounce: Duration,
    pending: Arc<Mutex<HashMap<ConnectionId, PendingTimer>>>,
    generations: AtomicU64,
}

impl HistorySnapshotWriter {
    pub fn new(
        rooms: Arc<dyn RoomStore>,
        history: Arc<dyn HistoryStore>,
        clock: Arc<dyn Clock>,
        debounce: Duration,
    ) -> Self {
        Self {
            rooms,
            history,
            clock,
            debounce,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generations: AtomicU64::new(0),
        }
    }

    /// Offer an edit for persistence.
    ///
    /// No-op unless the room is claimed and `author` is its owner. For an
    /// owner edit, any pending write for this connection is cancelled and a
    /// new one is scheduled after the quiet interval.
    pub async fn on_edit(
        &self,
        connection_id: &ConnectionId,
        room_name: &RoomName,
        author: Option<&AccountId>,
        text: &str,
    ) {
        let Some(author) = author else {
            return;
        };

        // Re-read the claim on every edit; ownership may have been
        // assigned since the session joined.
        let room = match self.rooms.find_by_name(room_name).await {
            Ok(Some(room)) => room,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("Room lookup failed for '{}': {}", room_name, e);
                return;
            }
        };

        match &room.claimed_by {
            Some(owner) if owner == author => {
                self.arm(*connection_id, room.id, author.clone(), text.to_string())
                    .await;
            }
            _ => {}
        }
    }

    /// Abandon any pending write for a connection (used at disconnect).
    pub async fn cancel(&self, connection_id: &ConnectionId) {
        let mut pending = self.pending.lock().await;
        if let Some(timer) = pending.remove(connection_id) {
            timer.handle.abort();
            tracing::debug!(
                "Abandoned pending snapshot for connection '{}'",
                connection_id
            );
        }
    }

    /// Number of currently pending writes (test helper)
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Replace-and-cancel: schedule a write for `connection_id`, aborting
    /// any previously scheduled one. The swap happens under the map lock,
    /// so arming is atomic per connection.
    async fn arm(&self, connection_id: ConnectionId, room_id: RoomId, author: AccountId, text: String) {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let pending = Arc::clone(&self.pending);
        let history = Arc::clone(&self.history);
        let clock = Arc::clone(&self.clock);
        let debounce = self.debounce;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            // Fired: clear our own entry, unless a newer edit already
            // replaced it (that timer owns the entry now).
            {
                let mut pending = pending.lock().await;
                if pending
                    .get(&connection_id)
                    .is_some_and(|timer| timer.generation == generation)
                {
                    pending.remove(&connection_id);
                }
            }

            let at = Timestamp::new(clock.now_millis());
            match history.append(room_id, author, text, at).await {
                Ok(()) => tracing::debug!("Text saved to history for room '{}'", room_id),
                Err(e) => tracing::warn!("Error saving text history: {}", e),
            }
        });

        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.insert(
            connection_id,
            PendingTimer { generation, handle },
        ) {
            previous.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::time::FixedClock;
    use crate::domain::{ClaimOutcome, HistoryStore};
    use crate::infrastructure::store::{InMemoryHistoryStore, InMemoryRoomStore};

    const DEBOUNCE: Duration = Duration::from_millis(2000);

    struct Fixture {
        rooms: Arc<InMemoryRoomStore>,
        history: Arc<InMemoryHistoryStore>,
        writer: HistorySnapshotWriter,
    }

    fn account(name: &str) -> AccountId {
        AccountId::new(name).unwrap()
    }

    fn fixture() -> Fixture {
        let rooms = Arc::new(InMemoryRoomStore::new());
        let history = Arc::new(InMemoryHistoryStore::new());
        let writer = HistorySnapshotWriter::new(
            rooms.clone(),
            history.clone(),
            Arc::new(FixedClock::new(1_700_000_000_000)),
            DEBOUNCE,
        );
        Fixture {
            rooms,
            history,
            writer,
        }
    }

    async fn claim(fixture: &Fixture, room: &str, owner: &str) -> RoomName {
        let name = RoomName::sanitize(room);
        let outcome = fixture
            .rooms
            .claim(&name, account(owner), Timestamp::new(0))
            .await
            .unwrap();
        assert_eq!(outcome, ClaimOutcome::Claimed);
        name
    }

    /// Let the debounce interval elapse (tests run with a paused clock)
    async fn let_debounce_elapse() {
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(100)).await;
        // fired tasks need a scheduling turn to run their append
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_owner_edit_is_persisted_after_quiet_interval() {
        // given:
        let f = fixture();
        let room = claim(&f, "mine", "alice").await;
        let conn = ConnectionId::new();

        // when:
        f.writer
            .on_edit(&conn, &room, Some(&account("alice")), "draft")
            .await;
        let_debounce_elapse().await;

        // then:
        let room_record = f.rooms.find_by_name(&room).await.unwrap().unwrap();
        let latest = f.history.latest(&room_record.id).await.unwrap().unwrap();
        assert_eq!(latest.text, "draft");
        assert_eq!(latest.author, account("alice"));
        assert_eq!(f.writer.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_produce_exactly_one_snapshot() {
        // given:
        let f = fixture();
        let room = claim(&f, "mine", "alice").await;
        let conn = ConnectionId::new();

        // when: five edits in a single burst, well inside the window
        for i in 1..=5 {
            f.writer
                .on_edit(&conn, &room, Some(&account("alice")), &format!("rev {i}"))
                .await;
        }
        let_debounce_elapse().await;

        // then: one snapshot, containing the last edit's text
        assert_eq!(f.history.len().await, 1);
        let room_record = f.rooms.find_by_name(&room).await.unwrap().unwrap();
        let latest = f.history.latest(&room_record.id).await.unwrap().unwrap();
        assert_eq!(latest.text, "rev 5");
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_owner_edit_is_never_persisted() {
        // given:
        let f = fixture();
        let room = claim(&f, "mine", "alice").await;
        let conn = ConnectionId::new();

        // when:
        f.writer
            .on_edit(&conn, &room, Some(&account("bob")), "intruder")
            .await;
        let_debounce_elapse().await;

        // then:
        assert!(f.history.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_in_unclaimed_room_is_never_persisted() {
        // given: the room does not exist in the store at all
        let f = fixture();
        let room = RoomName::sanitize("unclaimed");
        let conn = ConnectionId::new();

        // when:
        f.writer
            .on_edit(&conn, &room, Some(&account("alice")), "ephemeral")
            .await;
        let_debounce_elapse().await;

        // then:
        assert!(f.history.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_anonymous_edit_is_never_persisted() {
        // given:
        let f = fixture();
        let room = claim(&f, "mine", "alice").await;
        let conn = ConnectionId::new();

        // when:
        f.writer.on_edit(&conn, &room, None, "anonymous").await;
        let_debounce_elapse().await;

        // then:
        assert!(f.history.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_abandons_pending_write() {
        // given:
        let f = fixture();
        let room = claim(&f, "mine", "alice").await;
        let conn = ConnectionId::new();
        f.writer
            .on_edit(&conn, &room, Some(&account("alice")), "never saved")
            .await;

        // when: the connection goes away before the timer fires
        f.writer.cancel(&conn).await;
        let_debounce_elapse().await;

        // then: accepted data-loss window, nothing persisted
        assert!(f.history.is_empty().await);
        assert_eq!(f.writer.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_bursts_produce_two_snapshots() {
        // given:
        let f = fixture();
        let room = claim(&f, "mine", "alice").await;
        let conn = ConnectionId::new();

        // when: two bursts separated by a full quiet interval
        f.writer
            .on_edit(&conn, &room, Some(&account("alice")), "first burst")
            .await;
        let_debounce_elapse().await;
        f.writer
            .on_edit(&conn, &room, Some(&account("alice")), "second burst")
            .await;
        let_debounce_elapse().await;

        // then:
        assert_eq!(f.history.len().await, 2);
        let room_record = f.rooms.find_by_name(&room).await.unwrap().unwrap();
        let latest = f.history.latest(&room_record.id).await.unwrap().unwrap();
        assert_eq!(latest.text, "second burst");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timers_are_independent_per_connection() {
        // given: two owner sessions editing the same room
        let f = fixture();
        let room = claim(&f, "mine", "alice").await;
        let conn_a = ConnectionId::new();
        let conn_b = ConnectionId::new();

        // when:
        f.writer
            .on_edit(&conn_a, &room, Some(&account("alice")), "from a")
            .await;
        f.writer
            .on_edit(&conn_b, &room, Some(&account("alice")), "from b")
            .await;
        assert_eq!(f.writer.pending_count().await, 2);
        let_debounce_elapse().await;

        // then: one snapshot per connection's timer
        assert_eq!(f.history.len().await, 2);
    }
}
