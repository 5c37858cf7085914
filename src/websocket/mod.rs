pub mod handler;
pub mod msg_code_handler;
pub mod msg_join_handler;
pub mod msg_language_handler;
pub mod msg_leave_handler;
pub mod msg_ping_handler;

use tracing::error;
use crate::models::{ErrorMessage, ReceivedMessage, SendMessage};
use crate::rooms::{ConnectionId, RoomRegistry, SyncError};

pub use handler::websocket_handler;

/// Route one parsed frame to its handler.
pub async fn dispatch(message: ReceivedMessage, connection_id: ConnectionId, registry: &RoomRegistry) {
    match message {
        ReceivedMessage::JoinRoom(join_msg) => {
            msg_join_handler::handle_join_message(&join_msg, connection_id, registry).await
        }
        ReceivedMessage::LeaveRoom(leave_msg) => {
            msg_leave_handler::handle_leave_message(&leave_msg, connection_id, registry).await
        }
        ReceivedMessage::CodeChange(code_msg) => {
            msg_code_handler::handle_code_change_message(&code_msg, connection_id, registry).await
        }
        ReceivedMessage::LanguageChange(lang_msg) => {
            msg_language_handler::handle_language_change_message(&lang_msg, connection_id, registry).await
        }
        ReceivedMessage::Ping(ping_msg) => {
            msg_ping_handler::handle_ping_message(&ping_msg, connection_id, registry).await
        }
    }
}

/// Tell the requester, and only the requester, that its frame was refused.
async fn reject(registry: &RoomRegistry, connection_id: ConnectionId, room_id: Option<&str>, e: &SyncError) {
    let notice = SendMessage::Error(ErrorMessage {
        code: e.code().to_string(),
        message: e.to_string(),
        room_id: room_id.map(str::to_string),
    });
    if let Err(send_err) = registry.send_to(connection_id, notice).await {
        error!("Failed to send error notice to connection {}: {}", connection_id, send_err);
    }
}
