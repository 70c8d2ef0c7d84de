use crate::config::InitiatorPolicy;
use crate::error::SessionError;
use crate::media::{MediaBackend, run_session_worker};
use crate::session::{
    PeerEventSink, PeerSession, Role, SessionAction, SessionCommand, SessionEvent,
    SessionEventKind, SessionKey, SessionState,
};
use huddle_core::{
    ClientMessage, IceServerConfig, ParticipantId, RoomId, SdpKind, ServerMessage,
    SessionDescription, SignalData, SignalPayload,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// What happened to the call, for whoever renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    PeerAdded {
        participant_id: ParticipantId,
        role: Role,
    },
    /// Offer and answer are both in place.
    PeerStable { participant_id: ParticipantId },
    /// Media is flowing.
    PeerConnected { participant_id: ParticipantId },
    PeerClosed {
        participant_id: ParticipantId,
        reason: CloseReason,
    },
    /// Negotiation with one participant failed. Followed by `PeerClosed`.
    PeerFailed {
        participant_id: ParticipantId,
        error: String,
    },
    /// The controller stopped. Last event of a room session.
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    RemoteLeft,
    LocalLeave,
    /// Both sides offered at once and this side yielded.
    Glare,
    /// The remote started over with a fresh offer.
    Restarted,
    Failed,
    ConnectionLost,
}

#[derive(Debug)]
pub(crate) enum RoomCommand {
    Leave,
}

struct SessionSlot {
    key: SessionKey,
    session: PeerSession,
    worker: mpsc::UnboundedSender<SessionCommand>,
}

/// Full-mesh coordinator for one joined room.
///
/// Owns one [`PeerSession`] per remote member and is the only place their
/// state changes. Every input (server message, worker completion, local
/// command) is handled to completion before the next one is looked at.
pub(crate) struct RoomController {
    local_id: ParticipantId,
    room_id: RoomId,
    policy: InitiatorPolicy,
    backend: Arc<dyn MediaBackend>,
    ice_servers: Arc<Vec<IceServerConfig>>,
    outbound: mpsc::UnboundedSender<ClientMessage>,
    members: HashSet<ParticipantId>,
    sessions: HashMap<ParticipantId, SessionSlot>,
    next_key: u64,
    session_events: mpsc::UnboundedSender<SessionEvent>,
    room_events: mpsc::UnboundedSender<RoomEvent>,
}

fn dispatch(
    outbound: &mpsc::UnboundedSender<ClientMessage>,
    worker: &mpsc::UnboundedSender<SessionCommand>,
    remote: ParticipantId,
    actions: Vec<SessionAction>,
) {
    for action in actions {
        match action {
            SessionAction::Send(payload) => {
                let data = match SignalData::encode(&payload) {
                    Ok(data) => data,
                    Err(e) => {
                        error!("Cannot encode signal for {}: {}", remote, e);
                        continue;
                    }
                };
                if outbound
                    .send(ClientMessage::Signal { to: remote, data })
                    .is_err()
                {
                    debug!("Signaling channel closed, signal for {} dropped", remote);
                }
            }
            SessionAction::Run(command) => {
                if worker.send(command).is_err() {
                    debug!("Session worker for {} is gone", remote);
                }
            }
        }
    }
}

impl RoomController {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        local_id: ParticipantId,
        room_id: RoomId,
        policy: InitiatorPolicy,
        backend: Arc<dyn MediaBackend>,
        ice_servers: Arc<Vec<IceServerConfig>>,
        outbound: mpsc::UnboundedSender<ClientMessage>,
        session_events: mpsc::UnboundedSender<SessionEvent>,
        room_events: mpsc::UnboundedSender<RoomEvent>,
    ) -> Self {
        Self {
            local_id,
            room_id,
            policy,
            backend,
            ice_servers,
            outbound,
            members: HashSet::new(),
            sessions: HashMap::new(),
            next_key: 0,
            session_events,
            room_events,
        }
    }

    /// Seeds the member set from the join acknowledgement.
    pub(crate) fn on_joined(&mut self, members: Vec<ParticipantId>) {
        info!(
            "{} joined room {} with {} other members",
            self.local_id,
            self.room_id,
            members.len()
        );
        for member in members {
            if member == self.local_id || !self.members.insert(member) {
                continue;
            }
            if self.policy == InitiatorPolicy::Newcomer {
                self.open_session(member, Role::Initiator);
            }
        }
    }

    /// Drives the room until a leave is requested or the server connection drops.
    ///
    /// Hands the signaling queues back so the connection can be reused.
    pub(crate) async fn run(
        mut self,
        mut inbound: mpsc::UnboundedReceiver<ServerMessage>,
        mut commands: mpsc::Receiver<RoomCommand>,
        mut session_events: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> (
        mpsc::UnboundedSender<ClientMessage>,
        mpsc::UnboundedReceiver<ServerMessage>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => {
                    match command {
                        Some(RoomCommand::Leave) | None => {
                            self.leave();
                            break;
                        }
                    }
                }
                msg = inbound.recv() => {
                    match msg {
                        Some(msg) => self.on_server_message(msg),
                        None => {
                            warn!("Signaling connection lost in room {}", self.room_id);
                            self.close_all(CloseReason::ConnectionLost);
                            break;
                        }
                    }
                }
                Some(event) = session_events.recv() => self.on_session_event(event),
            }
        }

        let _ = self.room_events.send(RoomEvent::Left);
        (self.outbound, inbound)
    }

    fn on_server_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::ParticipantJoined {
                room_id,
                participant_id,
            } if room_id == self.room_id && participant_id != self.local_id => {
                self.members.insert(participant_id);
                if self.sessions.contains_key(&participant_id) {
                    self.close_session(participant_id, CloseReason::Restarted);
                }
                if self.policy == InitiatorPolicy::ExistingMembers {
                    self.open_session(participant_id, Role::Initiator);
                }
            }
            ServerMessage::ParticipantLeft {
                room_id,
                participant_id,
            } if room_id == self.room_id => {
                self.members.remove(&participant_id);
                self.close_session(participant_id, CloseReason::RemoteLeft);
            }
            ServerMessage::Signal { from, data } => self.on_signal(from, data),
            ServerMessage::Error { code, message } => {
                warn!("Server error in room {}: {:?} {}", self.room_id, code, message);
            }
            other => debug!("Ignoring {:?} in room {}", other, self.room_id),
        }
    }

    fn on_signal(&mut self, from: ParticipantId, data: SignalData) {
        if !self.members.contains(&from) {
            debug!("Signal from non-member {} dropped", from);
            return;
        }

        let payload = match data.decode() {
            Ok(payload) => payload,
            Err(e) => {
                if self.sessions.contains_key(&from) {
                    self.fail_session(from, e.into());
                } else {
                    warn!("Malformed signal from {} without a session: {}", from, e);
                }
                return;
            }
        };

        match payload {
            SignalPayload::Description(description) if description.kind == SdpKind::Offer => {
                self.on_remote_offer(from, description)
            }
            SignalPayload::Description(description) => {
                let Some(slot) = self.sessions.get_mut(&from) else {
                    warn!("Answer from {} without a session dropped", from);
                    return;
                };
                match slot.session.on_remote_description(description) {
                    Ok(actions) => dispatch(&self.outbound, &slot.worker, from, actions),
                    Err(e) => warn!("Ignoring description from {}: {}", from, e),
                }
            }
            SignalPayload::Candidate(candidate) => {
                let Some(slot) = self.sessions.get_mut(&from) else {
                    debug!("Candidate from {} without a session dropped", from);
                    return;
                };
                let actions = slot.session.on_remote_candidate(candidate);
                dispatch(&self.outbound, &slot.worker, from, actions);
            }
        }
    }

    fn on_remote_offer(&mut self, from: ParticipantId, offer: SessionDescription) {
        let existing = self
            .sessions
            .get(&from)
            .map(|slot| (slot.session.role(), slot.session.state()));

        match existing {
            Some((Role::Initiator, state)) if state != SessionState::Stable => {
                if self.local_id < from {
                    info!("Glare with {}: answering their offer", from);
                    self.close_session(from, CloseReason::Glare);
                } else {
                    debug!("Glare with {}: keeping our offer", from);
                    return;
                }
            }
            Some(_) => self.close_session(from, CloseReason::Restarted),
            None => {}
        }

        self.open_session(from, Role::Responder);
        let Some(slot) = self.sessions.get_mut(&from) else {
            return;
        };
        match slot.session.on_remote_description(offer) {
            Ok(actions) => dispatch(&self.outbound, &slot.worker, from, actions),
            Err(e) => self.fail_session(from, e),
        }
    }

    fn on_session_event(&mut self, event: SessionEvent) {
        let remote = event.remote;
        let Some(slot) = self.sessions.get_mut(&remote) else {
            debug!("Late {:?} for closed session with {}", event.kind, remote);
            return;
        };
        if slot.key != event.key {
            debug!("Stale {:?} for {} discarded", event.kind, remote);
            return;
        }

        let was_stable = slot.session.state() == SessionState::Stable;
        match event.kind {
            SessionEventKind::LocalDescription(description) => {
                let actions = slot.session.on_local_description(description);
                dispatch(&self.outbound, &slot.worker, remote, actions);
            }
            SessionEventKind::RemoteDescriptionApplied => {
                let actions = slot.session.on_remote_description_applied();
                dispatch(&self.outbound, &slot.worker, remote, actions);
            }
            SessionEventKind::LocalCandidate(candidate) => {
                let actions = slot.session.on_local_candidate(candidate);
                dispatch(&self.outbound, &slot.worker, remote, actions);
            }
            SessionEventKind::Connected => {
                if !slot.session.is_connected() {
                    slot.session.on_connected();
                    info!("Media connected with {}", remote);
                    let _ = self.room_events.send(RoomEvent::PeerConnected {
                        participant_id: remote,
                    });
                }
                return;
            }
            SessionEventKind::Failed(reason) => {
                self.fail_session(remote, SessionError::Backend(reason));
                return;
            }
        }

        if !was_stable && slot.session.state() == SessionState::Stable {
            let _ = self.room_events.send(RoomEvent::PeerStable {
                participant_id: remote,
            });
        }
    }

    fn open_session(&mut self, remote: ParticipantId, role: Role) {
        let key = SessionKey(self.next_key);
        self.next_key += 1;

        let (worker, commands) = mpsc::unbounded_channel();
        let sink = PeerEventSink::new(key, remote, self.session_events.clone());
        tokio::spawn(run_session_worker(
            self.backend.clone(),
            self.ice_servers.clone(),
            sink,
            commands,
        ));

        let mut session = PeerSession::new(remote, role);
        let actions = session.start();
        dispatch(&self.outbound, &worker, remote, actions);

        info!("Opened {:?} session with {}", role, remote);
        self.sessions.insert(
            remote,
            SessionSlot {
                key,
                session,
                worker,
            },
        );
        let _ = self.room_events.send(RoomEvent::PeerAdded {
            participant_id: remote,
            role,
        });
    }

    fn close_session(&mut self, remote: ParticipantId, reason: CloseReason) {
        let Some(mut slot) = self.sessions.remove(&remote) else {
            return;
        };
        let actions = slot.session.close();
        dispatch(&self.outbound, &slot.worker, remote, actions);

        info!("Closed session with {} ({:?})", remote, reason);
        let _ = self.room_events.send(RoomEvent::PeerClosed {
            participant_id: remote,
            reason,
        });
    }

    fn fail_session(&mut self, remote: ParticipantId, error: SessionError) {
        if !self.sessions.contains_key(&remote) {
            return;
        }
        warn!("Session with {} failed: {}", remote, error);
        let _ = self.room_events.send(RoomEvent::PeerFailed {
            participant_id: remote,
            error: error.to_string(),
        });
        self.close_session(remote, CloseReason::Failed);
    }

    fn close_all(&mut self, reason: CloseReason) {
        let remotes: Vec<ParticipantId> = self.sessions.keys().copied().collect();
        for remote in remotes {
            self.close_session(remote, reason);
        }
        self.members.clear();
    }

    fn leave(&mut self) {
        self.close_all(CloseReason::LocalLeave);
        if self
            .outbound
            .send(ClientMessage::Leave {
                room_id: self.room_id.clone(),
            })
            .is_err()
        {
            debug!("Signaling channel already closed, leave not sent");
        }
        info!("{} left room {}", self.local_id, self.room_id);
    }
}
