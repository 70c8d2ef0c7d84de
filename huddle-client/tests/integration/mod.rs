pub mod negotiation_tests;

use std::sync::Arc;

use anyhow::Result;
use huddle_client::{ClientConfig, InitiatorPolicy, RoomSession};
use huddle_core::RoomId;
use tracing::Level;

use crate::utils::{KillSwitch, Loopback, MockBackend};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Connects to the loopback server and joins `room_id` with a mock backend.
pub async fn join_with(
    server: &Loopback,
    backend: &MockBackend,
    room_id: &RoomId,
    policy: InitiatorPolicy,
) -> Result<(RoomSession, KillSwitch)> {
    let (channel, kill) = server.connect().await?;
    let config = ClientConfig {
        initiator_policy: policy,
        ..ClientConfig::default()
    };
    let session =
        RoomSession::join(&config, Arc::new(backend.clone()), channel, room_id.clone()).await?;
    Ok((session, kill))
}

pub async fn join(
    server: &Loopback,
    backend: &MockBackend,
    room_id: &RoomId,
) -> Result<(RoomSession, KillSwitch)> {
    join_with(server, backend, room_id, InitiatorPolicy::default()).await
}
