use serde::{Deserialize, Serialize};
use crate::models::RoomSnapshot;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomMessage {
    pub room_id: String,
    pub display_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomMessage {
    pub room_id: String,
    pub display_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeChangeMessage {
    pub buffer: String,
    pub room_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageChangeMessage {
    pub language: String,
    pub room_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PingMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUsersMessage {
    pub room_id: String,
    pub users: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PongMessage {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// Frames a client sends to the server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ReceivedMessage {
    #[serde(rename = "join-room")]
    JoinRoom(JoinRoomMessage),
    #[serde(rename = "leave-room")]
    LeaveRoom(LeaveRoomMessage),
    #[serde(rename = "code-change")]
    CodeChange(CodeChangeMessage),
    #[serde(rename = "language-change")]
    LanguageChange(LanguageChangeMessage),
    #[serde(rename = "ping")]
    Ping(PingMessage),
}

/// Frames the server sends to a client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SendMessage {
    #[serde(rename = "room-snapshot")]
    RoomSnapshot(RoomSnapshot),
    #[serde(rename = "code-change")]
    CodeChange(CodeChangeMessage),
    #[serde(rename = "language-change")]
    LanguageChange(LanguageChangeMessage),
    #[serde(rename = "update-users")]
    UpdateUsers(UpdateUsersMessage),
    #[serde(rename = "error")]
    Error(ErrorMessage),
    #[serde(rename = "pong")]
    Pong(PongMessage),
}

impl SendMessage {
    /// Room the frame is scoped to, if any.
    pub fn room_id(&self) -> Option<&str> {
        match self {
            SendMessage::RoomSnapshot(m) => Some(&m.room_id),
            SendMessage::CodeChange(m) => Some(&m.room_id),
            SendMessage::LanguageChange(m) => Some(&m.room_id),
            SendMessage::UpdateUsers(m) => Some(&m.room_id),
            SendMessage::Error(m) => m.room_id.as_deref(),
            SendMessage::Pong(_) => None,
        }
    }
}
