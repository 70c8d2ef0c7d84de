use crate::error::SessionError;
use huddle_core::{IceCandidate, ParticipantId, SdpKind, SessionDescription, SignalPayload};
use std::collections::VecDeque;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Negotiating,
    Stable,
    Closed,
}

/// Work for the peer-connection worker, executed strictly in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Generate an offer and install it as the local description.
    CreateOffer,
    /// Generate an answer and install it as the local description.
    CreateAnswer,
    ApplyRemoteDescription(SessionDescription),
    AddRemoteCandidate(IceCandidate),
    Close,
}

/// Output of a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Relay to the remote participant.
    Send(SignalPayload),
    Run(SessionCommand),
}

/// Negotiation state machine for one remote participant.
///
/// Pure: every input returns the actions it causes and nothing is executed
/// here. Inputs that arrive after [`PeerSession::close`] are ignored, which is
/// how late results of asynchronous generation steps are discarded.
#[derive(Debug)]
pub struct PeerSession {
    remote_id: ParticipantId,
    role: Role,
    state: SessionState,
    remote_description_applied: bool,
    local_description_sent: bool,
    connected: bool,
    /// Remote candidates that arrived before the remote description was applied.
    pending_candidates: VecDeque<IceCandidate>,
    /// Local candidates produced before our description went out.
    held_candidates: Vec<IceCandidate>,
}

impl PeerSession {
    pub fn new(remote_id: ParticipantId, role: Role) -> Self {
        Self {
            remote_id,
            role,
            state: SessionState::Idle,
            remote_description_applied: false,
            local_description_sent: false,
            connected: false,
            pending_candidates: VecDeque::new(),
            held_candidates: Vec::new(),
        }
    }

    pub fn initiator(remote_id: ParticipantId) -> Self {
        Self::new(remote_id, Role::Initiator)
    }

    pub fn responder(remote_id: ParticipantId) -> Self {
        Self::new(remote_id, Role::Responder)
    }

    pub fn remote_id(&self) -> ParticipantId {
        self.remote_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn pending_candidates(&self) -> impl Iterator<Item = &IceCandidate> {
        self.pending_candidates.iter()
    }

    /// Kicks off an initiator. Responders start when their offer arrives.
    pub fn start(&mut self) -> Vec<SessionAction> {
        if self.role != Role::Initiator || self.state != SessionState::Idle {
            return Vec::new();
        }
        self.transition(SessionState::Negotiating);
        vec![SessionAction::Run(SessionCommand::CreateOffer)]
    }

    /// The worker finished generating our offer or answer.
    pub fn on_local_description(&mut self, description: SessionDescription) -> Vec<SessionAction> {
        if self.state == SessionState::Closed {
            return Vec::new();
        }

        let kind = description.kind;
        self.local_description_sent = true;

        let mut actions = vec![SessionAction::Send(SignalPayload::Description(description))];
        actions.extend(
            self.held_candidates
                .drain(..)
                .map(|candidate| SessionAction::Send(SignalPayload::Candidate(candidate))),
        );

        if self.role == Role::Responder && kind == SdpKind::Answer {
            self.transition(SessionState::Stable);
        }
        actions
    }

    pub fn on_remote_description(
        &mut self,
        description: SessionDescription,
    ) -> Result<Vec<SessionAction>, SessionError> {
        if self.state == SessionState::Closed {
            return Ok(Vec::new());
        }

        let expected = match self.role {
            Role::Initiator => {
                description.kind == SdpKind::Answer
                    && self.state == SessionState::Negotiating
                    && !self.remote_description_applied
            }
            Role::Responder => {
                description.kind == SdpKind::Offer && self.state == SessionState::Idle
            }
        };
        if !expected {
            return Err(SessionError::UnexpectedDescription {
                kind: description.kind,
                state: self.state,
                role: self.role,
            });
        }

        match self.role {
            Role::Initiator => Ok(vec![SessionAction::Run(
                SessionCommand::ApplyRemoteDescription(description),
            )]),
            Role::Responder => {
                self.transition(SessionState::Negotiating);
                Ok(vec![
                    SessionAction::Run(SessionCommand::ApplyRemoteDescription(description)),
                    SessionAction::Run(SessionCommand::CreateAnswer),
                ])
            }
        }
    }

    /// The worker accepted the remote description. Flushes queued candidates in arrival order.
    pub fn on_remote_description_applied(&mut self) -> Vec<SessionAction> {
        if self.state == SessionState::Closed {
            return Vec::new();
        }

        self.remote_description_applied = true;
        let actions = self
            .pending_candidates
            .drain(..)
            .map(|candidate| SessionAction::Run(SessionCommand::AddRemoteCandidate(candidate)))
            .collect();

        if self.role == Role::Initiator {
            self.transition(SessionState::Stable);
        }
        actions
    }

    pub fn on_remote_candidate(&mut self, candidate: IceCandidate) -> Vec<SessionAction> {
        if self.state == SessionState::Closed {
            return Vec::new();
        }
        if self.remote_description_applied {
            return vec![SessionAction::Run(SessionCommand::AddRemoteCandidate(candidate))];
        }
        self.pending_candidates.push_back(candidate);
        Vec::new()
    }

    pub fn on_local_candidate(&mut self, candidate: IceCandidate) -> Vec<SessionAction> {
        if self.state == SessionState::Closed {
            return Vec::new();
        }
        if self.local_description_sent {
            return vec![SessionAction::Send(SignalPayload::Candidate(candidate))];
        }
        self.held_candidates.push(candidate);
        Vec::new()
    }

    pub fn on_connected(&mut self) {
        if self.state != SessionState::Closed {
            self.connected = true;
        }
    }

    /// Terminal. Only the first call yields the `Close` command.
    pub fn close(&mut self) -> Vec<SessionAction> {
        if self.state == SessionState::Closed {
            return Vec::new();
        }
        self.transition(SessionState::Closed);
        self.pending_candidates.clear();
        self.held_candidates.clear();
        self.connected = false;
        vec![SessionAction::Run(SessionCommand::Close)]
    }

    fn transition(&mut self, next: SessionState) {
        debug!(
            "Session with {} ({:?}): {:?} -> {:?}",
            self.remote_id, self.role, self.state, next
        );
        self.state = next;
    }
}
