use crate::error::RegistryError;
use crate::room::Room;
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use dashmap::mapref::entry::{Entry, VacantEntry};
use huddle_core::{ParticipantId, RoomId, RoomListingEntry, ServerMessage};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of admitting a participant into a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub room_id: RoomId,
    /// Members that were present before the join, excluding the joiner.
    pub existing_members: Vec<ParticipantId>,
}

/// Room registry.
///
/// Each room lives in its own entry of the room table and every mutation of
/// its member set happens while that entry is locked, so a join and a leave
/// on the same room never interleave. Rooms in different shards proceed
/// concurrently. Membership notifications are pushed to the per-connection
/// queues while the entry is still held, which orders them ahead of any
/// signal that could reference the new member.
#[derive(Clone)]
pub struct RoomManager {
    rooms: Arc<DashMap<RoomId, Room>>,
    memberships: Arc<DashMap<ParticipantId, RoomId>>,
    signaling: Arc<dyn SignalingOutput>,
    max_participants: Option<NonZeroUsize>,
}

impl RoomManager {
    pub fn new(signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            memberships: Arc::new(DashMap::new()),
            signaling,
            max_participants: None,
        }
    }

    pub fn with_max_participants(mut self, max_participants: Option<NonZeroUsize>) -> Self {
        self.max_participants = max_participants;
        self
    }

    /// Opens a room for `creator`, who becomes its first member.
    ///
    /// The room never exists without a member: it is created and joined under
    /// one entry lock, and the creator leaves any previous room afterwards.
    pub fn create_room(
        &self,
        requested: Option<RoomId>,
        creator: ParticipantId,
    ) -> Result<JoinOutcome, RegistryError> {
        let (outcome, previous) = match requested {
            Some(room_id) => match self.rooms.entry(room_id.clone()) {
                Entry::Occupied(_) => return Err(RegistryError::RoomIdTaken(room_id)),
                Entry::Vacant(slot) => self.open_room(slot, creator),
            },
            None => loop {
                if let Entry::Vacant(slot) = self.rooms.entry(RoomId::generate()) {
                    break self.open_room(slot, creator);
                }
            },
        };

        self.leave_previous(previous, &outcome.room_id, &creator);
        Ok(outcome)
    }

    /// Admits `participant_id` into `room_id`, creating the room if needed.
    ///
    /// The seat in the target room is claimed before the participant leaves
    /// the room it was in, so a rejected join leaves membership untouched.
    /// Joining the room one is already in is a leave followed by a join.
    pub fn join(
        &self,
        room_id: RoomId,
        participant_id: ParticipantId,
    ) -> Result<JoinOutcome, RegistryError> {
        let (outcome, previous) = {
            let mut room = self
                .rooms
                .entry(room_id.clone())
                .or_insert_with(|| Room::new(room_id.clone()));

            let rejoin = room.contains(&participant_id);
            if let Some(max) = self.max_participants {
                if !rejoin && room.len() >= max.get() {
                    return Err(RegistryError::RoomFull {
                        room_id,
                        max_participants: max,
                    });
                }
            }

            if rejoin {
                debug!("{} rejoins room {}", participant_id, room_id);
                room.remove(&participant_id);
                self.announce_departure(&room, &participant_id);
            }
            self.admit(&mut room, participant_id)
        };

        self.leave_previous(previous, &outcome.room_id, &participant_id);
        Ok(outcome)
    }

    /// Removes `participant_id` from `room_id`. Returns `false` when it was not a member.
    pub fn leave(&self, room_id: &RoomId, participant_id: &ParticipantId) -> bool {
        let now_empty = {
            let Some(mut room) = self.rooms.get_mut(room_id) else {
                return false;
            };
            if !room.remove(participant_id) {
                return false;
            }
            self.memberships
                .remove_if(participant_id, |_, current| current == room_id);

            self.announce_departure(&room, participant_id);

            info!(
                "{} left room {} ({} members)",
                participant_id,
                room_id,
                room.len()
            );
            room.is_empty()
        };

        if now_empty && self.rooms.remove_if(room_id, |_, room| room.is_empty()).is_some() {
            info!("Room {} is empty, removed", room_id);
        }

        true
    }

    /// Implicit leave for a closed connection. Safe to call any number of times.
    pub fn disconnect(&self, participant_id: &ParticipantId) {
        if let Some(room_id) = self.room_of(participant_id) {
            self.leave(&room_id, participant_id);
        }
    }

    /// Snapshot of non-empty rooms, ordered by id.
    pub fn list_rooms(&self) -> Vec<RoomListingEntry> {
        let mut listing: Vec<RoomListingEntry> = self
            .rooms
            .iter()
            .filter(|room| !room.is_empty())
            .map(|room| room.listing_entry())
            .collect();
        listing.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        listing
    }

    pub fn members(&self, room_id: &RoomId) -> Option<Vec<ParticipantId>> {
        self.rooms.get(room_id).map(|room| room.members())
    }

    pub fn room_of(&self, participant_id: &ParticipantId) -> Option<RoomId> {
        self.memberships
            .get(participant_id)
            .map(|room_id| room_id.value().clone())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn open_room(
        &self,
        slot: VacantEntry<'_, RoomId, Room>,
        creator: ParticipantId,
    ) -> (JoinOutcome, Option<RoomId>) {
        let room_id = slot.key().clone();
        info!("Created room {}", room_id);
        self.signaling.send(
            &creator,
            ServerMessage::RoomCreated {
                room_id: room_id.clone(),
            },
        );
        let mut room = slot.insert(Room::new(room_id));
        self.admit(&mut room, creator)
    }

    /// Seats `participant_id` and sends both join notifications. Must run
    /// under the room's entry lock. Returns the room the participant was
    /// recorded in before, if it was another one.
    fn admit(
        &self,
        room: &mut Room,
        participant_id: ParticipantId,
    ) -> (JoinOutcome, Option<RoomId>) {
        let room_id = room.id().clone();
        let existing_members = room.members();
        room.insert(participant_id);
        let previous = self
            .memberships
            .insert(participant_id, room_id.clone())
            .filter(|previous| *previous != room_id);

        self.signaling.send(
            &participant_id,
            ServerMessage::Joined {
                room_id: room_id.clone(),
                members: existing_members.clone(),
            },
        );
        for member in &existing_members {
            self.signaling.send(
                member,
                ServerMessage::ParticipantJoined {
                    room_id: room_id.clone(),
                    participant_id,
                },
            );
        }

        info!(
            "{} joined room {} ({} members)",
            participant_id,
            room_id,
            room.len()
        );

        (
            JoinOutcome {
                room_id,
                existing_members,
            },
            previous,
        )
    }

    fn leave_previous(
        &self,
        previous: Option<RoomId>,
        current: &RoomId,
        participant_id: &ParticipantId,
    ) {
        if let Some(previous) = previous {
            debug!(
                "{} switched from room {} to {}",
                participant_id, previous, current
            );
            self.leave(&previous, participant_id);
        }
    }

    fn announce_departure(&self, room: &Room, participant_id: &ParticipantId) {
        for member in room.members() {
            self.signaling.send(
                &member,
                ServerMessage::ParticipantLeft {
                    room_id: room.id().clone(),
                    participant_id: *participant_id,
                },
            );
        }
    }
}
