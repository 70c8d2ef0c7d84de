use huddle_core::{IceCandidate, ParticipantId, SessionDescription};
use tokio::sync::mpsc;
use tracing::debug;

/// Identifies one incarnation of a peer session.
///
/// A remote participant can get several sessions over time (glare, restart,
/// rejoin). Completions carry the key of the session that requested them, and
/// anything whose key no longer matches is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey(pub u64);

#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub key: SessionKey,
    pub remote: ParticipantId,
    pub kind: SessionEventKind,
}

#[derive(Debug, Clone)]
pub enum SessionEventKind {
    LocalDescription(SessionDescription),
    RemoteDescriptionApplied,
    LocalCandidate(IceCandidate),
    Connected,
    Failed(String),
}

/// Handle a peer connection uses to report back to its room controller.
#[derive(Debug, Clone)]
pub struct PeerEventSink {
    key: SessionKey,
    remote: ParticipantId,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl PeerEventSink {
    pub(crate) fn new(
        key: SessionKey,
        remote: ParticipantId,
        tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self { key, remote, tx }
    }

    pub fn remote_id(&self) -> ParticipantId {
        self.remote
    }

    pub fn local_candidate(&self, candidate: IceCandidate) {
        self.emit(SessionEventKind::LocalCandidate(candidate));
    }

    pub fn connected(&self) {
        self.emit(SessionEventKind::Connected);
    }

    pub fn failed(&self, reason: impl Into<String>) {
        self.emit(SessionEventKind::Failed(reason.into()));
    }

    pub(crate) fn local_description(&self, description: SessionDescription) {
        self.emit(SessionEventKind::LocalDescription(description));
    }

    pub(crate) fn remote_description_applied(&self) {
        self.emit(SessionEventKind::RemoteDescriptionApplied);
    }

    fn emit(&self, kind: SessionEventKind) {
        let event = SessionEvent {
            key: self.key,
            remote: self.remote,
            kind,
        };
        if self.tx.send(event).is_err() {
            debug!("Room controller gone, dropping event for {}", self.remote);
        }
    }
}
