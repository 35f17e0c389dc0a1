//! The room synchronization engine.
//!
//! - [`ConnectionRegistry`] — live connections grouped by room name
//! - [`TextBroadcaster`] — fan-out of text mutations to room peers
//! - [`HistorySnapshotWriter`] — debounced owner-only snapshot persistence
//! - [`ClaimRoomUseCase`] — one-time room ownership assignment
//! - [`RoomSession`] — per-connection state machine tying them together

mod broadcast;
mod claim;
mod registry;
mod session;
mod snapshot_writer;

pub use broadcast::TextBroadcaster;
pub use claim::{ClaimDecision, ClaimRoomUseCase};
pub use registry::ConnectionRegistry;
pub use session::{RoomSession, SessionState};
pub use snapshot_writer::{DEFAULT_DEBOUNCE, HistorySnapshotWriter};
