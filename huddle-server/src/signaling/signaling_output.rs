use huddle_core::{ParticipantId, ServerMessage};

/// Delivery seam between the registry/relay and whatever owns the connections.
///
/// Called while a room entry is locked, so implementations must only enqueue.
pub trait SignalingOutput: Send + Sync {
    /// Queues `msg` for `to`. Returns `false` if `to` is not connected.
    fn send(&self, to: &ParticipantId, msg: ServerMessage) -> bool;
}
