use uuid::Uuid;

/// Conditions raised by the room core.
///
/// None of these are fatal for the process: they are scoped to one room or one
/// recipient and are absorbed at the component boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Language tag outside the configured set.
    InvalidLanguage(String),
    /// The room does not exist (never joined or already emptied).
    RoomNotFound(String),
    /// A blank room identifier.
    InvalidRoomId(String),
    /// A send to one connection's outbox failed.
    DeliveryFailure { connection_id: Uuid, reason: String },
    /// The connection was never registered or has already disconnected.
    UnknownConnection(Uuid),
    /// A write from a connection that is not a member of the room.
    NotMember { room_id: String, connection_id: Uuid },
}

impl SyncError {
    /// Short machine-readable code, sent to clients in `error` frames.
    pub fn code(&self) -> &'static str {
        match self {
            SyncError::InvalidLanguage(_) => "invalid-language",
            SyncError::RoomNotFound(_) => "room-not-found",
            SyncError::InvalidRoomId(_) => "invalid-room",
            SyncError::DeliveryFailure { .. } => "delivery-failure",
            SyncError::UnknownConnection(_) => "unknown-connection",
            SyncError::NotMember { .. } => "not-a-member",
        }
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::InvalidLanguage(tag) => write!(f, "Unsupported language '{}'", tag),
            SyncError::RoomNotFound(room_id) => write!(f, "Room '{}' does not exist", room_id),
            SyncError::InvalidRoomId(room_id) => write!(f, "Invalid room id '{}'", room_id),
            SyncError::DeliveryFailure { connection_id, reason } => {
                write!(f, "Failed to deliver to connection {}: {}", connection_id, reason)
            }
            SyncError::UnknownConnection(connection_id) => {
                write!(f, "Connection {} is not registered", connection_id)
            }
            SyncError::NotMember { room_id, connection_id } => {
                write!(f, "Connection {} is not a member of room '{}'", connection_id, room_id)
            }
        }
    }
}

impl std::error::Error for SyncError {}
