use crate::model::participant::ParticipantId;
use crate::model::room::{RoomId, RoomListingEntry};
use crate::model::session::SignalData;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Frames sent by a client to the coordination server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    Join {
        room_id: RoomId,
    },
    Leave {
        room_id: RoomId,
    },
    ListRooms,
    CreateRoom {
        #[serde(default)]
        room_id: Option<RoomId>,
    },
    /// Envelope for the relay. The sender is never part of it.
    Signal {
        to: ParticipantId,
        data: SignalData,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    RoomIdTaken,
    RoomFull,
    MalformedMessage,
}

/// Frames sent by the coordination server to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    Welcome {
        participant_id: ParticipantId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    /// Membership view handed to a participant right after it is admitted.
    Joined {
        room_id: RoomId,
        members: Vec<ParticipantId>,
    },
    RoomCreated {
        room_id: RoomId,
    },
    RoomList(Vec<RoomListingEntry>),
    ParticipantJoined {
        room_id: RoomId,
        participant_id: ParticipantId,
    },
    ParticipantLeft {
        room_id: RoomId,
        participant_id: ParticipantId,
    },
    /// Relayed envelope; `from` is stamped by the server.
    Signal {
        from: ParticipantId,
        data: SignalData,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}
