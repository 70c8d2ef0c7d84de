use huddle_core::{ClientMessage, ErrorCode, ServerMessage};
use huddle_server::ServerConfig;

use crate::integration::init_tracing;
use crate::utils::{TestClient, start_test_server};

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() {
    init_tracing();

    let (addr, _state) = start_test_server(ServerConfig::default())
        .await
        .expect("Failed to start server");
    let mut client = TestClient::connect(addr).await.expect("Connect failed");

    client
        .send_raw(r#"{"op":"join","d":{"room":42}}"#)
        .await
        .expect("Send failed");
    let ServerMessage::Error { code, .. } = client.recv().await.expect("No error frame") else {
        panic!("expected an error");
    };
    assert_eq!(code, ErrorCode::MalformedMessage);

    client.send(&ClientMessage::ListRooms).await.expect("Send failed");
    assert_eq!(
        client.recv().await.expect("No room list"),
        ServerMessage::RoomList(vec![])
    );
}
