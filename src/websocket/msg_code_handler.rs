use tracing::{debug, warn};
use crate::models::CodeChangeMessage;
use crate::rooms::{ConnectionId, RoomRegistry};
use super::reject;

/// Handle CodeChangeMessage
pub async fn handle_code_change_message(code_msg: &CodeChangeMessage, connection_id: ConnectionId, registry: &RoomRegistry) {
    match registry.set_buffer(&code_msg.room_id, &code_msg.buffer, Some(connection_id)).await {
        Ok(true) => {}
        // A missing room means everyone already left; the next join recreates it.
        Ok(false) => {
            debug!("Ignoring code change for missing room {} from connection {}", code_msg.room_id, connection_id);
        }
        Err(e) => {
            warn!("Code change in room {} by connection {} rejected: {}", code_msg.room_id, connection_id, e);
            reject(registry, connection_id, Some(&code_msg.room_id), &e).await;
        }
    }
}
