//! Concrete store implementations.

mod inmemory;

pub use inmemory::{InMemoryHistoryStore, InMemoryIdentityProvider, InMemoryRoomStore};
