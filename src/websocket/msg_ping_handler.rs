use tracing::{debug, error};
use chrono::Utc;
use crate::models::{PingMessage, PongMessage, SendMessage};
use crate::rooms::{ConnectionId, RoomRegistry};

/// Handle PingMessage
pub async fn handle_ping_message(ping_msg: &PingMessage, connection_id: ConnectionId, registry: &RoomRegistry) {
    debug!("Ping received from connection {}", connection_id);

    // Reply with pong
    let pong = SendMessage::Pong(PongMessage {
        date: Utc::now().to_rfc3339(),
        nonce: ping_msg.nonce.clone(),
    });
    if let Err(e) = registry.send_to(connection_id, pong).await {
        error!("Failed to send Pong to connection {}: {}", connection_id, e);
    }
}
