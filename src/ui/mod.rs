//! UI layer: the axum server, shared handler state, and the WebSocket/HTTP
//! handlers.

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::{Server, router};
pub use state::AppState;
