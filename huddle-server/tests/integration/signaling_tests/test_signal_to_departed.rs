use huddle_core::{ClientMessage, ParticipantId, SignalData};
use huddle_server::{RelayOutcome, ServerConfig, SignalEnvelope};
use serde_json::json;

use crate::integration::{create_test_registry, init_tracing};
use crate::utils::{TestClient, eventually, start_test_server};

#[tokio::test]
async fn test_signal_to_departed_participant_is_silently_dropped() {
    init_tracing();

    let (addr, state) = start_test_server(ServerConfig::default())
        .await
        .expect("Failed to start server");

    let mut client1 = TestClient::connect(addr).await.expect("Client 1 failed");
    let client2 = TestClient::connect(addr).await.expect("Client 2 failed");
    let gone = client2.participant_id;

    client2.close().await.expect("Failed to close client 2");
    assert!(eventually(|| !state.signaling.is_connected(&gone)).await);

    client1
        .send(&ClientMessage::Signal {
            to: gone,
            data: SignalData(json!({"kind": "candidate", "candidate": "x"})),
        })
        .await
        .expect("Signal failed");

    assert!(client1.is_quiet().await, "sender must not see an error");
    assert!(state.signaling.is_connected(&client1.participant_id));
}

#[tokio::test]
async fn test_relay_reports_miss_without_delivery() {
    init_tracing();

    let (_rooms, relay, signaling) = create_test_registry();
    let sender = ParticipantId::new();
    let target = ParticipantId::new();
    signaling.connect(sender);

    let outcome = relay.relay(
        sender,
        SignalEnvelope {
            to: target,
            data: SignalData(json!(null)),
        },
    );

    assert_eq!(outcome, RelayOutcome::Dropped);
    assert!(signaling.messages_for(&target).is_empty());
    assert!(signaling.messages_for(&sender).is_empty());
}
