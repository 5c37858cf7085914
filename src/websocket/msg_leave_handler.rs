use tracing::info;
use crate::models::LeaveRoomMessage;
use crate::rooms::{ConnectionId, RoomRegistry};

/// Handle LeaveRoomMessage
pub async fn handle_leave_message(leave_msg: &LeaveRoomMessage, connection_id: ConnectionId, registry: &RoomRegistry) {
    info!("Leave request for room {} from connection {} ({})", leave_msg.room_id, connection_id, leave_msg.display_name);
    registry.leave(&leave_msg.room_id, connection_id).await;
}
