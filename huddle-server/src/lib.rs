//! Coordination server: room registry, signaling relay and the WebSocket
//! front door that connects clients to both.

mod config;
mod error;
mod room;
mod signaling;
mod state;

pub use config::ServerConfig;
pub use error::RegistryError;
pub use room::*;
pub use signaling::*;
pub use state::AppState;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use huddle_core::RoomListingEntry;
use std::sync::Arc;

/// `/ws` for signaling, `/rooms` for the lobby listing.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/rooms", get(list_rooms))
        .with_state(state)
}

async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomListingEntry>> {
    Json(state.room_manager.list_rooms())
}
