//! Shared text room server.
//!
//! Connections join a named room over WebSocket; text edits are fanned out
//! to the other members, and rooms claimed by a verified account persist
//! the owner's edits as debounced history snapshots.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! cargo run --bin server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sharepad::{
    common::{logger::setup_logger, time::SystemClock},
    domain::AccountId,
    infrastructure::{
        pusher::WebSocketPeerSender,
        store::{InMemoryHistoryStore, InMemoryIdentityProvider, InMemoryRoomStore},
    },
    ui::{AppState, Server},
    usecase::{
        ClaimRoomUseCase, ConnectionRegistry, DEFAULT_DEBOUNCE, HistorySnapshotWriter,
        TextBroadcaster,
    },
};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Real-time shared text room server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Quiet interval in milliseconds before an owner edit is persisted
    #[arg(long, default_value_t = DEFAULT_DEBOUNCE.as_millis() as u64)]
    debounce_ms: u64,

    /// Account ids treated as verified (repeatable; stand-in for the
    /// external identity system)
    #[arg(long = "verified-account")]
    verified_accounts: Vec<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Stores and clock
    // 2. PeerSender
    // 3. Engine components
    // 4. AppState
    // 5. Server

    // 1. Stores (in-memory) and clock
    let rooms = Arc::new(InMemoryRoomStore::new());
    let history = Arc::new(InMemoryHistoryStore::new());
    let identities = Arc::new(InMemoryIdentityProvider::new());
    let clock = Arc::new(SystemClock);

    for raw in &args.verified_accounts {
        match AccountId::new(raw.clone()) {
            Ok(account) => {
                tracing::info!("Account '{}' marked verified", account);
                identities.add_verified(account).await;
            }
            Err(e) => tracing::warn!("Skipping verified account '{}': {}", raw, e),
        }
    }

    // 2. PeerSender (WebSocket implementation)
    let pusher = Arc::new(WebSocketPeerSender::new());

    // 3. Engine components
    let registry = Arc::new(ConnectionRegistry::new(pusher.clone()));
    let broadcaster = Arc::new(TextBroadcaster::new(registry.clone(), pusher.clone()));
    let snapshots = Arc::new(HistorySnapshotWriter::new(
        rooms.clone(),
        history.clone(),
        clock.clone(),
        Duration::from_millis(args.debounce_ms),
    ));
    let claim = Arc::new(ClaimRoomUseCase::new(
        rooms.clone(),
        identities.clone(),
        clock,
    ));

    // 4. Shared state
    let state = Arc::new(AppState {
        registry,
        broadcaster,
        snapshots,
        claim,
        rooms,
        history,
        pusher,
    });

    // 5. Create and run the server
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
