use crate::session::{PeerEventSink, SessionCommand};
use anyhow::Result;
use async_trait::async_trait;
use huddle_core::{IceCandidate, IceServerConfig, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Local media plus a factory for peer connections.
///
/// Everything the negotiation logic needs from a real-time media stack goes
/// through this seam, so the room controller runs unchanged against webrtc-rs
/// or a scripted stand-in.
#[async_trait]
pub trait MediaBackend: Send + Sync + 'static {
    /// Acquires the local audio source. Called once, before joining.
    async fn open_local_audio(&self) -> Result<()>;

    /// Builds a peer connection with the local audio attached.
    ///
    /// Candidates and connection-state changes are reported through `events`.
    async fn create_peer_connection(
        &self,
        ice_servers: &[IceServerConfig],
        events: PeerEventSink,
    ) -> Result<Box<dyn PeerConnection>>;
}

#[async_trait]
pub trait PeerConnection: Send + Sync {
    /// Creates an offer and installs it as the local description.
    async fn create_offer(&self) -> Result<SessionDescription>;

    /// Creates an answer and installs it as the local description.
    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Owns one peer connection and executes session commands against it in order.
///
/// Completions go back through `events`. The connection is closed on
/// [`SessionCommand::Close`] or when the command channel is dropped.
pub async fn run_session_worker(
    backend: Arc<dyn MediaBackend>,
    ice_servers: Arc<Vec<IceServerConfig>>,
    events: PeerEventSink,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
) {
    let remote = events.remote_id();
    let pc = match backend
        .create_peer_connection(&ice_servers, events.clone())
        .await
    {
        Ok(pc) => pc,
        Err(e) => {
            warn!("Cannot create peer connection for {}: {:#}", remote, e);
            events.failed(format!("{e:#}"));
            return;
        }
    };

    while let Some(command) = commands.recv().await {
        match command {
            SessionCommand::CreateOffer => match pc.create_offer().await {
                Ok(offer) => events.local_description(offer),
                Err(e) => events.failed(format!("create offer: {e:#}")),
            },
            SessionCommand::CreateAnswer => match pc.create_answer().await {
                Ok(answer) => events.local_description(answer),
                Err(e) => events.failed(format!("create answer: {e:#}")),
            },
            SessionCommand::ApplyRemoteDescription(description) => {
                match pc.set_remote_description(description).await {
                    Ok(()) => events.remote_description_applied(),
                    Err(e) => events.failed(format!("apply remote description: {e:#}")),
                }
            }
            SessionCommand::AddRemoteCandidate(candidate) => {
                if let Err(e) = pc.add_ice_candidate(candidate).await {
                    warn!("Candidate from {} rejected: {:#}", remote, e);
                }
            }
            SessionCommand::Close => break,
        }
    }

    if let Err(e) = pc.close().await {
        warn!("Closing peer connection for {} failed: {:#}", remote, e);
    }
    debug!("Session worker for {} finished", remote);
}
