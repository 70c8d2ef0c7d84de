mod controller;
mod peer_session;
mod room_session;
mod session_event;

pub(crate) use controller::RoomCommand;
pub use controller::{CloseReason, RoomEvent};
pub use peer_session::*;
pub use room_session::*;
pub use session_event::*;
