use tracing::{debug, warn};
use crate::models::LanguageChangeMessage;
use crate::rooms::{ConnectionId, RoomRegistry};
use super::reject;

/// Handle LanguageChangeMessage
pub async fn handle_language_change_message(lang_msg: &LanguageChangeMessage, connection_id: ConnectionId, registry: &RoomRegistry) {
    match registry.set_language(&lang_msg.room_id, &lang_msg.language, Some(connection_id)).await {
        Ok(true) => {}
        Ok(false) => {
            debug!("Ignoring language change for missing room {} from connection {}", lang_msg.room_id, connection_id);
        }
        Err(e) => {
            warn!("Language change in room {} by connection {} rejected: {}", lang_msg.room_id, connection_id, e);
            reject(registry, connection_id, Some(&lang_msg.room_id), &e).await;
        }
    }
}
