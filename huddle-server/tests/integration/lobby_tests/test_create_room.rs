use huddle_core::{ClientMessage, ErrorCode, ParticipantId, ServerMessage};
use huddle_server::{RegistryError, ServerConfig};

use crate::integration::{create_test_registry, init_tracing};
use crate::utils::{TestClient, start_test_server};

#[tokio::test]
async fn test_create_room_twice_yields_distinct_ids() {
    init_tracing();

    let (rooms, _relay, signaling) = create_test_registry();
    let p1 = ParticipantId::new();
    let p2 = ParticipantId::new();
    signaling.connect(p1);
    signaling.connect(p2);

    let first = rooms.create_room(None, p1).expect("First create failed");
    let second = rooms.create_room(None, p2).expect("Second create failed");

    assert_ne!(first.room_id, second.room_id);
    assert_eq!(rooms.room_count(), 2);
    assert_eq!(
        rooms.create_room(Some(first.room_id.clone()), p2),
        Err(RegistryError::RoomIdTaken(first.room_id))
    );
    assert_eq!(rooms.room_of(&p2), Some(second.room_id));
}

#[tokio::test]
async fn test_create_room_over_the_wire_joins_creator() {
    init_tracing();

    let (addr, state) = start_test_server(ServerConfig::default())
        .await
        .expect("Failed to start server");
    let mut client1 = TestClient::connect(addr).await.expect("Client 1 failed");
    let mut client2 = TestClient::connect(addr).await.expect("Client 2 failed");

    client1
        .send(&ClientMessage::CreateRoom { room_id: None })
        .await
        .expect("Create failed");

    let ServerMessage::RoomCreated { room_id } = client1.recv().await.expect("No roomCreated")
    else {
        panic!("expected roomCreated");
    };
    assert_eq!(
        client1.recv().await.expect("No joined frame"),
        ServerMessage::Joined {
            room_id: room_id.clone(),
            members: vec![],
        }
    );
    assert_eq!(
        state.room_manager.members(&room_id),
        Some(vec![client1.participant_id])
    );

    client2
        .send(&ClientMessage::CreateRoom {
            room_id: Some(room_id.clone()),
        })
        .await
        .expect("Create failed");
    let ServerMessage::Error { code, .. } = client2.recv().await.expect("No error frame") else {
        panic!("expected an error");
    };
    assert_eq!(code, ErrorCode::RoomIdTaken);
    assert_eq!(state.room_manager.room_of(&client2.participant_id), None);
}
