use crate::config::ServerConfig;
use crate::room::RoomManager;
use crate::signaling::{SignalEnvelope, SignalingOutput, SignalingRelay, SignalingService};
use huddle_core::{
    ClientMessage, ErrorCode, IceServerConfig, ParticipantId, ServerMessage,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Everything a connection handler needs: connections, rooms and the relay.
pub struct AppState {
    pub signaling: SignalingService,
    pub room_manager: RoomManager,
    pub relay: SignalingRelay,
    ice_servers: Vec<IceServerConfig>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let signaling = SignalingService::new();
        let output: Arc<dyn SignalingOutput> = Arc::new(signaling.clone());

        Self {
            room_manager: RoomManager::new(output.clone())
                .with_max_participants(config.max_participants),
            relay: SignalingRelay::new(output),
            signaling,
            ice_servers: config.ice_servers.clone(),
        }
    }

    /// Registers a new connection and queues its `welcome` and `iceConfig` frames.
    pub fn connect(&self) -> (ParticipantId, mpsc::UnboundedReceiver<ServerMessage>) {
        let participant_id = ParticipantId::new();
        let (tx, rx) = mpsc::unbounded_channel();

        self.signaling.add_peer(participant_id, tx);
        self.signaling
            .send(&participant_id, ServerMessage::Welcome { participant_id });
        self.signaling.send(
            &participant_id,
            ServerMessage::IceConfig {
                ice_servers: self.ice_servers.clone(),
            },
        );

        (participant_id, rx)
    }

    pub fn handle_message(&self, from: ParticipantId, msg: ClientMessage) {
        match msg {
            ClientMessage::Join { room_id } => {
                if let Err(e) = self.room_manager.join(room_id, from) {
                    warn!("Join rejected for {}: {}", from, e);
                    self.send_error(&from, e.code(), e.to_string());
                }
            }

            ClientMessage::Leave { room_id } => {
                if !self.room_manager.leave(&room_id, &from) {
                    debug!("{} asked to leave {} but is not a member", from, room_id);
                }
            }

            ClientMessage::ListRooms => {
                self.signaling
                    .send(&from, ServerMessage::RoomList(self.room_manager.list_rooms()));
            }

            ClientMessage::CreateRoom { room_id } => {
                if let Err(e) = self.room_manager.create_room(room_id, from) {
                    warn!("Room creation rejected for {}: {}", from, e);
                    self.send_error(&from, e.code(), e.to_string());
                }
            }

            ClientMessage::Signal { to, data } => {
                self.relay.relay(from, SignalEnvelope { to, data });
            }
        }
    }

    pub fn reject_malformed(&self, from: ParticipantId, err: &serde_json::Error) {
        self.send_error(&from, ErrorCode::MalformedMessage, err.to_string());
    }

    /// Implicit leave plus removal from the connection table. Idempotent.
    pub fn disconnect(&self, participant_id: &ParticipantId) {
        self.room_manager.disconnect(participant_id);
        self.signaling.remove_peer(participant_id);
    }

    fn send_error(&self, to: &ParticipantId, code: ErrorCode, message: String) {
        self.signaling.send(to, ServerMessage::Error { code, message });
    }
}
