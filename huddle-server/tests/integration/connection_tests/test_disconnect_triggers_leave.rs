use huddle_core::{ClientMessage, RoomId, ServerMessage};
use huddle_server::ServerConfig;

use crate::integration::init_tracing;
use crate::utils::{TestClient, eventually, start_test_server};

#[tokio::test]
async fn test_abrupt_disconnect_notifies_remaining_members() {
    init_tracing();

    let (addr, state) = start_test_server(ServerConfig::default())
        .await
        .expect("Failed to start server");
    let room_id = RoomId::from("R");

    let mut client1 = TestClient::connect(addr).await.expect("Client 1 failed");
    let mut client2 = TestClient::connect(addr).await.expect("Client 2 failed");
    let mut client3 = TestClient::connect(addr).await.expect("Client 3 failed");

    for client in [&mut client1, &mut client2, &mut client3] {
        client
            .send(&ClientMessage::Join {
                room_id: room_id.clone(),
            })
            .await
            .expect("Join failed");
        client
            .recv_matching(|msg| matches!(msg, ServerMessage::Joined { .. }))
            .await
            .expect("No joined frame");
    }

    let departed = client3.participant_id;
    // No close frame: the socket just goes away.
    drop(client3);

    for client in [&mut client1, &mut client2] {
        let msg = client
            .recv_matching(|msg| matches!(msg, ServerMessage::ParticipantLeft { .. }))
            .await
            .expect("No departure notification");
        assert_eq!(
            msg,
            ServerMessage::ParticipantLeft {
                room_id: room_id.clone(),
                participant_id: departed,
            }
        );
        assert!(client.is_quiet().await, "departure must be announced once");
    }

    let mut expected = vec![client1.participant_id, client2.participant_id];
    expected.sort();
    assert!(
        eventually(|| {
            let mut members = state.room_manager.members(&room_id).unwrap_or_default();
            members.sort();
            members == expected
        })
        .await
    );
}
