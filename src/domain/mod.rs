//! Domain model: value objects, entities, and the traits the core engine
//! needs from its collaborators (stores, identity lookup, peer delivery).

mod connection;
mod room;
mod snapshot;
mod timestamp;

pub mod pusher;
pub mod repository;

pub use connection::ConnectionId;
pub use pusher::{PeerChannel, PeerSender, PushError};
pub use repository::{ClaimOutcome, HistoryStore, IdentityProvider, RoomStore, StoreError};
pub use room::{
    AccountId, DEFAULT_ROOM_NAME, InvalidAccountId, Room, RoomAccess, RoomId, RoomName,
    evaluate_access,
};
pub use snapshot::Snapshot;
pub use timestamp::Timestamp;
