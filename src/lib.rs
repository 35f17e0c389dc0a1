//! Real-time shared text room server library.
//!
//! This library implements a WebSocket-based synchronization engine for
//! named text rooms: connections join a room, text edits are fanned out to
//! the other members of the room, and rooms claimed by a verified account
//! persist the owner's edits as debounced history snapshots.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// shared library
pub mod common;
