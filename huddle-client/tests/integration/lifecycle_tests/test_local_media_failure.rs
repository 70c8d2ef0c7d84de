use std::sync::Arc;

use huddle_client::{ClientConfig, ClientError, RoomSession};
use huddle_core::RoomId;

use crate::integration::init_tracing;
use crate::utils::{Loopback, MockBackend};

#[tokio::test]
async fn test_local_media_failure_is_fatal() {
    init_tracing();

    let server = Loopback::new();
    let room_id = RoomId::from("R");
    let (channel, _kill) = server.connect().await.expect("connect failed");
    let local = channel.local_id();

    let result = RoomSession::join(
        &ClientConfig::default(),
        Arc::new(MockBackend::failing_audio()),
        channel,
        room_id.clone(),
    )
    .await;

    let err = result.err().expect("join must fail without local audio");
    assert!(matches!(err, ClientError::LocalMedia(_)));
    assert!(err.to_string().contains("no audio input device"));

    // Nothing reached the server.
    assert_eq!(server.state.room_manager.room_of(&local), None);
    assert!(server.state.room_manager.members(&room_id).is_none());
}
