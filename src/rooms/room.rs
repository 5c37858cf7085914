use uuid::Uuid;

use super::router::Outbox;

pub type ConnectionId = Uuid;

/// One connection's membership in a room.
#[derive(Clone, Debug)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub(super) outbox: Outbox,
}

/// Authoritative state of a single room.
///
/// Only the registry mutates a room, and only while holding the room's lock.
#[derive(Debug)]
pub struct Room {
    id: String,
    buffer: String,
    language: String,
    participants: Vec<Participant>,
    closed: bool,
}

impl Room {
    pub(super) fn new(id: &str, language: &str) -> Self {
        Self {
            id: id.to_string(),
            buffer: String::new(),
            language: language.to_string(),
            participants: Vec::new(),
            closed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Members in join order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.participants.iter().any(|p| p.connection_id == connection_id)
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// A closed room has been emptied and dropped from the registry; any handle
    /// still pointing at it must be discarded.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(super) fn close(&mut self) {
        self.closed = true;
    }

    pub(super) fn set_buffer(&mut self, text: String) {
        self.buffer = text;
    }

    pub(super) fn set_language(&mut self, tag: String) {
        self.language = tag;
    }

    /// Add a participant, or rename it in place if the connection is already a
    /// member. Returns true when the connection was not a member before.
    pub(super) fn upsert(&mut self, participant: Participant) -> bool {
        match self
            .participants
            .iter_mut()
            .find(|p| p.connection_id == participant.connection_id)
        {
            Some(existing) => {
                existing.display_name = participant.display_name;
                existing.outbox = participant.outbox;
                false
            }
            None => {
                self.participants.push(participant);
                true
            }
        }
    }

    pub(super) fn remove(&mut self, connection_id: ConnectionId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.connection_id != connection_id);
        self.participants.len() != before
    }
}
