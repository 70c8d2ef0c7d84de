use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::media::MediaBackend;
use crate::session::controller::RoomController;
use crate::session::{RoomCommand, RoomEvent};
use crate::transport::SignalChannel;
use huddle_core::{ClientMessage, ErrorCode, ParticipantId, RoomId, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Handle to a joined room.
///
/// The call itself runs on a background task that negotiates with every
/// other member. Events come out of [`RoomSession::next_event`].
pub struct RoomSession {
    local_id: ParticipantId,
    room_id: RoomId,
    commands: mpsc::Sender<RoomCommand>,
    events: mpsc::UnboundedReceiver<RoomEvent>,
    task: JoinHandle<SignalChannel>,
}

impl RoomSession {
    /// Acquires local audio, joins `room_id` and starts negotiating with its members.
    ///
    /// Failing to open local audio is fatal and nothing is sent to the server.
    /// A rejected join hands the channel back inside [`ClientError::JoinRejected`].
    pub async fn join(
        config: &ClientConfig,
        backend: Arc<dyn MediaBackend>,
        mut channel: SignalChannel,
        room_id: RoomId,
    ) -> Result<Self, ClientError> {
        if let Err(e) = backend.open_local_audio().await {
            error!("Cannot open local audio: {:#}", e);
            return Err(ClientError::LocalMedia(e.into()));
        }

        channel.send(ClientMessage::Join {
            room_id: room_id.clone(),
        })?;

        let members = loop {
            let reply = channel.recv().await;
            match reply {
                Some(ServerMessage::Joined {
                    room_id: joined,
                    members,
                }) if joined == room_id => break members,
                Some(ServerMessage::Error {
                    code: code @ (ErrorCode::RoomFull | ErrorCode::RoomIdTaken),
                    message,
                }) => {
                    return Err(ClientError::JoinRejected {
                        room_id,
                        code,
                        message,
                        channel: Box::new(channel),
                    });
                }
                Some(ServerMessage::Error { code, message }) => {
                    warn!("Ignoring {:?} error while joining {}: {}", code, room_id, message);
                }
                Some(other) => debug!("Skipping {:?} while joining {}", other, room_id),
                None => return Err(ClientError::ConnectionClosed),
            }
        };

        let SignalChannel {
            local_id,
            ice_servers: announced,
            outbound,
            inbound,
        } = channel;
        let ice_servers = Arc::new(config.resolve_ice_servers(&announced));

        let (command_tx, command_rx) = mpsc::channel(8);
        let (room_tx, room_rx) = mpsc::unbounded_channel();
        let (session_tx, session_rx) = mpsc::unbounded_channel();

        let mut controller = RoomController::new(
            local_id,
            room_id.clone(),
            config.initiator_policy,
            backend,
            ice_servers,
            outbound,
            session_tx,
            room_tx,
        );
        controller.on_joined(members);

        let task = tokio::spawn(async move {
            let (outbound, inbound) = controller.run(inbound, command_rx, session_rx).await;
            SignalChannel {
                local_id,
                ice_servers: announced,
                outbound,
                inbound,
            }
        });

        Ok(Self {
            local_id,
            room_id,
            commands: command_tx,
            events: room_rx,
            task,
        })
    }

    pub fn local_id(&self) -> ParticipantId {
        self.local_id
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Next room event. `None` after [`RoomEvent::Left`] has been taken.
    pub async fn next_event(&mut self) -> Option<RoomEvent> {
        self.events.recv().await
    }

    /// Asks the controller to close every session and leave. Events keep flowing until `Left`.
    pub async fn leave(&self) {
        if self.commands.send(RoomCommand::Leave).await.is_err() {
            debug!("Room controller for {} already stopped", self.room_id);
        }
    }

    /// Leaves (if still joined) and returns the signaling channel for reuse.
    pub async fn close(self) -> Result<SignalChannel, ClientError> {
        self.leave().await;
        self.task
            .await
            .map_err(|e| ClientError::Protocol(format!("room controller aborted: {e}")))
    }
}
