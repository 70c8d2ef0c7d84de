//! Client side of huddle.
//!
//! A [`RoomSession`] joins a room over a [`SignalChannel`] and keeps a full
//! mesh of peer sessions, one per other member, negotiated through the
//! server's signaling relay. Media goes through a [`MediaBackend`];
//! [`RtcBackend`] is the webrtc-rs implementation.

mod config;
mod error;
pub mod media;
pub mod session;
pub mod transport;

pub use config::{ClientConfig, InitiatorPolicy};
pub use error::{ClientError, SessionError};
pub use media::{MediaBackend, PeerConnection, RtcBackend};
pub use session::{CloseReason, PeerEventSink, Role, RoomEvent, RoomSession, SessionState};
pub use transport::{SignalChannel, connect};
