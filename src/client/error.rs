/// Failures surfaced by the sync client.
#[derive(Debug)]
pub enum ClientError {
    Transport(tokio_tungstenite::tungstenite::Error),
    Serialization(serde_json::Error),
    /// The operation needs a joined room.
    NotJoined,
    /// Language tag the room does not accept.
    InvalidLanguage(String),
    /// The connection to the server is gone.
    Closed,
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Transport(e) => write!(f, "WebSocket transport error: {}", e),
            ClientError::Serialization(e) => write!(f, "Failed to encode frame: {}", e),
            ClientError::NotJoined => write!(f, "Not joined to a room"),
            ClientError::InvalidLanguage(tag) => write!(f, "Unsupported language '{}'", tag),
            ClientError::Closed => write!(f, "Connection closed"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error;
        match e {
            Error::ConnectionClosed | Error::AlreadyClosed => ClientError::Closed,
            e => ClientError::Transport(e),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Serialization(e)
    }
}
