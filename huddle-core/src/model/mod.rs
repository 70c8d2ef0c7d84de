mod participant;
mod room;
mod session;
mod signaling;

pub use participant::{IdParseError, ParticipantId};
pub use room::{RoomId, RoomListingEntry};
pub use session::{IceCandidate, PayloadError, SdpKind, SessionDescription, SignalData, SignalPayload};
pub use signaling::{ClientMessage, ErrorCode, IceServerConfig, ServerMessage};
