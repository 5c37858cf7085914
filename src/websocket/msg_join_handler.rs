use tracing::{info, warn};
use crate::models::JoinRoomMessage;
use crate::rooms::{ConnectionId, RoomRegistry};
use super::reject;

/// Display name used when the client sends a blank one.
pub const GUEST_NAME: &str = "Guest";

/// Handle JoinRoomMessage
pub async fn handle_join_message(join_msg: &JoinRoomMessage, connection_id: ConnectionId, registry: &RoomRegistry) {
    let display_name = match join_msg.display_name.trim() {
        "" => GUEST_NAME,
        name => name,
    };
    info!("Join request for room {} from connection {} as {}", join_msg.room_id, connection_id, display_name);

    // The snapshot and roster reach the client through its outbox.
    if let Err(e) = registry.join(&join_msg.room_id, connection_id, display_name).await {
        warn!("Join of room '{}' by connection {} rejected: {}", join_msg.room_id, connection_id, e);
        reject(registry, connection_id, Some(&join_msg.room_id), &e).await;
    }
}
