//! Concrete peer delivery implementations.

mod websocket;

pub use websocket::WebSocketPeerSender;
