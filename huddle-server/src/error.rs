use huddle_core::{ErrorCode, RoomId};
use std::num::NonZeroUsize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("room `{0}` is already active")]
    RoomIdTaken(RoomId),

    #[error("room `{room_id}` is full ({max_participants} participants)")]
    RoomFull {
        room_id: RoomId,
        max_participants: NonZeroUsize,
    },
}

impl RegistryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistryError::RoomIdTaken(_) => ErrorCode::RoomIdTaken,
            RegistryError::RoomFull { .. } => ErrorCode::RoomFull,
        }
    }
}
