use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Room state handed to a participant when it joins.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: String,
    pub buffer: String,
    pub language: String,
    pub users: Vec<String>,
    /// Language tags the server accepts for this room.
    pub languages: Vec<String>,
}

/// Response for room inspection
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryResponse {
    pub room_id: String,
    pub language: String,
    pub users: Vec<String>,
    pub buffer_length: usize,
}

/// Response for a freshly issued room id
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: String,
}

/// Response listing the accepted languages
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LanguagesResponse {
    pub languages: Vec<String>,
    pub default_language: String,
}
