use crate::models::UpdateUsersMessage;
use super::room::Room;

/// Derives rosters from room membership. Holds no state of its own, so a
/// roster can never drift from the registry.
pub struct PresenceTracker;

impl PresenceTracker {
    /// Display names of the room's members in join order.
    pub fn compute(room: &Room) -> Vec<String> {
        room.participants()
            .iter()
            .map(|p| p.display_name.clone())
            .collect()
    }

    /// The `update-users` payload for the room as it is right now.
    pub fn roster_message(room: &Room) -> UpdateUsersMessage {
        UpdateUsersMessage {
            room_id: room.id().to_string(),
            users: Self::compute(room),
        }
    }
}
