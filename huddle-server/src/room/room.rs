use huddle_core::{ParticipantId, RoomId, RoomListingEntry};
use std::collections::HashSet;

/// Member set of one room. Only ever touched through the registry's room table.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    members: HashSet<ParticipantId>,
}

impl Room {
    pub(crate) fn new(id: RoomId) -> Self {
        Self {
            id,
            members: HashSet::new(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn members(&self) -> Vec<ParticipantId> {
        self.members.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, participant_id: &ParticipantId) -> bool {
        self.members.contains(participant_id)
    }

    pub(crate) fn insert(&mut self, participant_id: ParticipantId) -> bool {
        self.members.insert(participant_id)
    }

    pub(crate) fn remove(&mut self, participant_id: &ParticipantId) -> bool {
        self.members.remove(participant_id)
    }

    pub fn listing_entry(&self) -> RoomListingEntry {
        RoomListingEntry {
            room_id: self.id.clone(),
            member_count: self.members.len(),
        }
    }
}
