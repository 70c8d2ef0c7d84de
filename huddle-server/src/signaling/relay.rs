use crate::signaling::SignalingOutput;
use huddle_core::{ParticipantId, ServerMessage, SignalData};
use std::sync::Arc;
use tracing::debug;

/// Envelope as received from a sender. The sender id is not part of it.
#[derive(Debug, Clone)]
pub struct SignalEnvelope {
    pub to: ParticipantId,
    pub data: SignalData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered,
    Dropped,
}

/// Forwards signaling envelopes between two connections without reading them.
#[derive(Clone)]
pub struct SignalingRelay {
    output: Arc<dyn SignalingOutput>,
}

impl SignalingRelay {
    pub fn new(output: Arc<dyn SignalingOutput>) -> Self {
        Self { output }
    }

    /// Delivers `envelope.data` to `envelope.to`, stamped with `sender_id`.
    ///
    /// Envelopes for participants that are gone are dropped without error.
    pub fn relay(&self, sender_id: ParticipantId, envelope: SignalEnvelope) -> RelayOutcome {
        let SignalEnvelope { to, data } = envelope;
        let delivered = self.output.send(
            &to,
            ServerMessage::Signal {
                from: sender_id,
                data,
            },
        );

        if delivered {
            RelayOutcome::Delivered
        } else {
            debug!("Relay miss: {} -> {} (not connected)", sender_id, to);
            RelayOutcome::Dropped
        }
    }
}
