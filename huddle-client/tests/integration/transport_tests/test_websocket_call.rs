use std::sync::Arc;

use huddle_client::{ClientConfig, RoomSession, connect};
use huddle_core::RoomId;
use huddle_core::utils::default_stun_urls;
use huddle_server::{AppState, ServerConfig};

use crate::integration::init_tracing;
use crate::utils::{MockBackend, eventually, wait_connected};

#[tokio::test]
async fn test_call_over_websocket() {
    init_tracing();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(AppState::new(&ServerConfig::default()));
    let app = huddle_server::router(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let url = format!("ws://{addr}/ws");
    let channel1 = connect(&url).await.expect("client 1 failed to connect");
    let channel2 = connect(&url).await.expect("client 2 failed to connect");
    assert_ne!(channel1.local_id(), channel2.local_id());
    assert_eq!(channel1.ice_servers()[0].urls, default_stun_urls());

    let room_id = RoomId::from("ws-room");
    let config = ClientConfig::default();
    let backend1 = MockBackend::new();
    let backend2 = MockBackend::new();
    let mut p1 = RoomSession::join(&config, Arc::new(backend1), channel1, room_id.clone())
        .await
        .expect("P1 join failed");
    let mut p2 = RoomSession::join(&config, Arc::new(backend2), channel2, room_id.clone())
        .await
        .expect("P2 join failed");

    let (id1, id2) = (p1.local_id(), p2.local_id());
    wait_connected(&mut p1, id2).await.expect("P1 never connected");
    wait_connected(&mut p2, id1).await.expect("P2 never connected");

    // The leave goes out over the socket before the channel is handed back.
    let channel = p2.close().await.expect("P2 close failed");
    drop(channel);
    assert!(
        eventually(|| state.room_manager.members(&room_id) == Some(vec![id1])).await,
        "server still lists the departed client"
    );
}
