use crate::error::ClientError;
use huddle_core::{ClientMessage, IceServerConfig, ParticipantId, ServerMessage};
use tokio::sync::mpsc;
use tracing::debug;

/// One established connection to the coordination server.
///
/// Delivery is reliable and ordered in both directions. The identity and ICE
/// configuration are the ones the server announced when the connection opened.
#[derive(Debug)]
pub struct SignalChannel {
    pub(crate) local_id: ParticipantId,
    pub(crate) ice_servers: Vec<IceServerConfig>,
    pub(crate) outbound: mpsc::UnboundedSender<ClientMessage>,
    pub(crate) inbound: mpsc::UnboundedReceiver<ServerMessage>,
}

impl SignalChannel {
    /// Wraps a pair of message queues and consumes the `welcome` / `iceConfig` preamble.
    pub async fn establish(
        outbound: mpsc::UnboundedSender<ClientMessage>,
        mut inbound: mpsc::UnboundedReceiver<ServerMessage>,
    ) -> Result<Self, ClientError> {
        let local_id = match inbound.recv().await {
            Some(ServerMessage::Welcome { participant_id }) => participant_id,
            Some(other) => {
                return Err(ClientError::Protocol(format!(
                    "expected welcome, got {other:?}"
                )));
            }
            None => return Err(ClientError::ConnectionClosed),
        };

        let ice_servers = match inbound.recv().await {
            Some(ServerMessage::IceConfig { ice_servers }) => ice_servers,
            Some(other) => {
                return Err(ClientError::Protocol(format!(
                    "expected iceConfig, got {other:?}"
                )));
            }
            None => return Err(ClientError::ConnectionClosed),
        };

        debug!(
            "Signaling channel established as {} ({} ice servers)",
            local_id,
            ice_servers.len()
        );

        Ok(Self {
            local_id,
            ice_servers,
            outbound,
            inbound,
        })
    }

    pub fn local_id(&self) -> ParticipantId {
        self.local_id
    }

    /// ICE servers announced by the server.
    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.ice_servers
    }

    pub fn send(&self, msg: ClientMessage) -> Result<(), ClientError> {
        self.outbound
            .send(msg)
            .map_err(|_| ClientError::ConnectionClosed)
    }

    /// Next server message, `None` once the connection is gone.
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.inbound.recv().await
    }
}
