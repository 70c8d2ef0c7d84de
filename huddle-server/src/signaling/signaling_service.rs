use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use huddle_core::{ParticipantId, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

struct SignalingInner {
    peers: DashMap<ParticipantId, mpsc::UnboundedSender<ServerMessage>>,
}

/// Table of live connections, each represented by its outbound queue.
///
/// Every queue is drained in order by the connection's writer task, which
/// keeps delivery FIFO per recipient.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
            }),
        }
    }

    pub fn add_peer(&self, participant_id: ParticipantId, tx: mpsc::UnboundedSender<ServerMessage>) {
        self.inner.peers.insert(participant_id, tx);
    }

    pub fn remove_peer(&self, participant_id: &ParticipantId) {
        self.inner.peers.remove(participant_id);
    }

    pub fn is_connected(&self, participant_id: &ParticipantId) -> bool {
        self.inner.peers.contains_key(participant_id)
    }

    pub fn connected_count(&self) -> usize {
        self.inner.peers.len()
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalingOutput for SignalingService {
    fn send(&self, to: &ParticipantId, msg: ServerMessage) -> bool {
        let Some(peer) = self.inner.peers.get(to) else {
            debug!("Dropping message for disconnected participant {}", to);
            return false;
        };
        if peer.send(msg).is_err() {
            warn!("Outbound queue of {} is closed", to);
            return false;
        }
        true
    }
}
