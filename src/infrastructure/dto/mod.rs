//! Data transfer objects for the wire.

pub mod http;
pub mod websocket;
