//! Server assembly and execution.

use std::sync::Arc;

use axum::{Router, routing::get, routing::post};
use tower_http::trace::TraceLayer;

use super::handler::http::{claim_room, get_room_history, get_room_summary, health_check};
use super::handler::websocket::websocket_handler;
use super::signal::shutdown_signal;
use super::state::AppState;

/// Build the application router over the shared state.
///
/// Exposed separately from [`Server::run`] so tests can serve the same
/// routes on an ephemeral listener.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket_handler))
        // HTTP endpoints
        .route("/api/health", get(health_check))
        .route("/api/rooms/claim", post(claim_room))
        .route("/api/rooms/{room_name}", get(get_room_summary))
        .route("/api/rooms/{room_name}/history", get(get_room_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Shared text room server.
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Run the server until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified
    /// address or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = router(self.state);

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "Shared text room server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
