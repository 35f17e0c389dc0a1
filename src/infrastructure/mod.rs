//! Infrastructure layer: wire DTOs, concrete stores, and the WebSocket
//! peer sender.

pub mod dto;
pub mod pusher;
pub mod store;
