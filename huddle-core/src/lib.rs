//! Shared model of the huddle signaling protocol.
//!
//! Both the coordination server and the client speak the types defined here:
//! identifiers, the room listing projection, the opaque signaling envelope and
//! the JSON wire messages exchanged over the transport channel.

pub mod model;
pub mod utils;

pub use model::{
    ClientMessage, ErrorCode, IceCandidate, IceServerConfig, IdParseError, ParticipantId,
    PayloadError, RoomId, RoomListingEntry, SdpKind, ServerMessage, SessionDescription, SignalData,
    SignalPayload,
};
