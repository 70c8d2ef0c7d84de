use crate::session::{Role, SessionState};
use crate::transport::SignalChannel;
use huddle_core::{ErrorCode, PayloadError, RoomId, SdpKind};
use thiserror::Error;

/// Failures that end (or prevent) a room session.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot acquire local audio: {0}")]
    LocalMedia(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server turned the join down. The connection stays open and is
    /// handed back so the caller can try again or pick another room.
    #[error("join of room `{room_id}` rejected ({code:?}): {message}")]
    JoinRejected {
        room_id: RoomId,
        code: ErrorCode,
        message: String,
        channel: Box<SignalChannel>,
    },

    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("signaling connection closed")]
    ConnectionClosed,

    #[error("protocol violation: {0}")]
    Protocol(String),
}

/// Failure of a single peer session. Never escalates past that session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unexpected {kind:?} description while {state:?} as {role:?}")]
    UnexpectedDescription {
        kind: SdpKind,
        state: SessionState,
        role: Role,
    },

    #[error(transparent)]
    Malformed(#[from] PayloadError),

    #[error("peer connection failure: {0}")]
    Backend(String),
}
