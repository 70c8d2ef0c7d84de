use huddle_client::{CloseReason, RoomEvent};
use huddle_core::{RoomId, SdpKind, SessionDescription, SignalPayload};
use serde_json::json;

use crate::integration::{init_tracing, join};
use crate::utils::{
    Loopback, MockBackend, MockCall, drain, eventually, wait_all_connected, wait_connected,
    wait_for,
};

#[tokio::test]
async fn test_malformed_signal_closes_only_that_session() {
    init_tracing();

    let server = Loopback::new();
    let room_id = RoomId::from("R");
    let backend1 = MockBackend::new();
    let backend2 = MockBackend::new();

    let (mut p1, _kill1) = join(&server, &backend1, &room_id).await.expect("P1 join failed");
    let (mut p2, _kill2) = join(&server, &backend2, &room_id).await.expect("P2 join failed");
    let (id1, id2) = (p1.local_id(), p2.local_id());
    wait_connected(&mut p1, id2).await.expect("P1-P2");
    wait_connected(&mut p2, id1).await.expect("P2-P1");

    let (mut raw, _raw_kill) = server.raw_peer().await.expect("raw peer failed");
    let members = raw.join(&room_id).await.expect("raw join failed");
    assert_eq!(members.len(), 2);
    let raw_id = raw.id();

    // Both members offer to the newcomer.
    for from in [id1, id2] {
        let offer = raw.recv_signal_from(from).await.expect("no offer");
        assert!(matches!(
            offer,
            SignalPayload::Description(SessionDescription {
                kind: SdpKind::Offer,
                ..
            })
        ));
    }

    // P1 gets an answer its media stack rejects.
    raw.signal(
        id1,
        &SignalPayload::Description(SessionDescription::answer("malformed")),
    )
    .unwrap();
    // P2 gets something that is not a payload at all.
    raw.signal_raw(id2, json!({"kind": "bogus"})).unwrap();

    for (session, backend) in [(&mut p1, &backend1), (&mut p2, &backend2)] {
        let events = wait_for(session, |event| {
            matches!(event, RoomEvent::PeerClosed { participant_id, .. } if *participant_id == raw_id)
        })
        .await
        .expect("failed session was not closed");
        assert!(events.iter().any(|event| matches!(
            event,
            RoomEvent::PeerFailed { participant_id, .. } if *participant_id == raw_id
        )));
        assert_eq!(
            events.last(),
            Some(&RoomEvent::PeerClosed {
                participant_id: raw_id,
                reason: CloseReason::Failed
            })
        );

        let later = drain(session).await;
        assert!(
            !later
                .iter()
                .any(|event| matches!(event, RoomEvent::PeerClosed { .. } | RoomEvent::Left)),
            "failure leaked past its session: {later:?}"
        );
        assert!(eventually(|| backend.count_for(&raw_id, &MockCall::Close) == 1).await);
    }

    assert_eq!(backend1.count_for(&id2, &MockCall::Close), 0);
    assert_eq!(backend2.count_for(&id1, &MockCall::Close), 0);
    assert_eq!(server.state.room_manager.members(&room_id).unwrap().len(), 3);

    // The controllers keep serving the room: a fresh offer from the same member is answered.
    raw.signal(
        id1,
        &SignalPayload::Description(SessionDescription::offer("v=0 retry")),
    )
    .unwrap();
    wait_all_connected(&mut p1, &[raw_id])
        .await
        .expect("retry was not answered");
}
