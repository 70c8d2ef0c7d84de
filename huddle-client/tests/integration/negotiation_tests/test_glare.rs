use huddle_client::{CloseReason, InitiatorPolicy, Role, RoomEvent};
use huddle_core::RoomId;

use crate::integration::{init_tracing, join_with};
use crate::utils::{Loopback, MockBackend, drain, wait_connected};

#[tokio::test]
async fn test_simultaneous_offers_resolve_to_one_session() {
    init_tracing();

    let server = Loopback::new();
    let room_id = RoomId::from("R");
    let backend_a = MockBackend::new();
    let backend_b = MockBackend::new();

    // A offers because it was there first, B offers because it is the newcomer.
    let (a, _kill_a) = join_with(&server, &backend_a, &room_id, InitiatorPolicy::ExistingMembers)
        .await
        .expect("A join failed");
    let (b, _kill_b) = join_with(&server, &backend_b, &room_id, InitiatorPolicy::Newcomer)
        .await
        .expect("B join failed");

    let (mut smaller, mut larger) = if a.local_id() < b.local_id() {
        (a, b)
    } else {
        (b, a)
    };
    let (small_id, large_id) = (smaller.local_id(), larger.local_id());

    let small_events = wait_connected(&mut smaller, large_id)
        .await
        .expect("smaller side never connected");
    let large_events = wait_connected(&mut larger, small_id)
        .await
        .expect("larger side never connected");

    // The smaller id yields and answers.
    assert!(small_events.contains(&RoomEvent::PeerClosed {
        participant_id: large_id,
        reason: CloseReason::Glare
    }));
    let last_added = small_events
        .iter()
        .rev()
        .find(|event| matches!(event, RoomEvent::PeerAdded { .. }));
    assert_eq!(
        last_added,
        Some(&RoomEvent::PeerAdded {
            participant_id: large_id,
            role: Role::Responder
        })
    );

    // The larger id keeps its offer.
    assert_eq!(
        large_events
            .iter()
            .filter(|event| matches!(event, RoomEvent::PeerAdded { .. }))
            .collect::<Vec<_>>(),
        vec![&RoomEvent::PeerAdded {
            participant_id: small_id,
            role: Role::Initiator
        }]
    );
    assert!(
        !large_events
            .iter()
            .any(|event| matches!(event, RoomEvent::PeerClosed { .. }))
    );

    for session in [&mut smaller, &mut larger] {
        let later = drain(session).await;
        assert!(
            !later
                .iter()
                .any(|event| matches!(event, RoomEvent::PeerClosed { .. })),
            "session torn down after glare settled: {later:?}"
        );
    }
}
