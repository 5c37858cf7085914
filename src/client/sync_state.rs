use std::collections::VecDeque;

use crate::models::{
    CodeChangeMessage, ErrorMessage, JoinRoomMessage, LanguageChangeMessage, LeaveRoomMessage,
    ReceivedMessage, SendMessage,
};
use super::error::ClientError;

/// Where a participant stands with respect to its room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPhase {
    Disconnected,
    /// Join sent, snapshot not yet received.
    Joining { room_id: String },
    Joined { room_id: String },
}

/// Effect of one inbound frame on the mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Joined,
    Buffer,
    Language,
    Roster,
    /// The server refused one of our frames. The mirror is left as it was
    /// unless the refused frame was our pending join.
    Rejected(ErrorMessage),
    Pong,
    /// Frame for another room, or one that does not fit the current phase.
    Ignored,
}

/// One participant's mirror of its room.
///
/// The mirror is disposable: inbound room events overwrite it
/// unconditionally (last write wins) and a new snapshot rebuilds it from
/// scratch. Local edits land in the mirror at once and queue a frame for the
/// server; the server never echoes them back to their author.
#[derive(Debug, Clone)]
pub struct ClientSyncState {
    phase: SyncPhase,
    display_name: String,
    buffer: String,
    language: String,
    roster: Vec<String>,
    languages: Vec<String>,
    pending: VecDeque<ReceivedMessage>,
}

impl Default for ClientSyncState {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSyncState {
    pub fn new() -> Self {
        Self {
            phase: SyncPhase::Disconnected,
            display_name: String::new(),
            buffer: String::new(),
            language: String::new(),
            roster: Vec::new(),
            languages: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn phase(&self) -> &SyncPhase {
        &self.phase
    }

    pub fn is_joined(&self) -> bool {
        matches!(self.phase, SyncPhase::Joined { .. })
    }

    /// Room we are joined to or joining.
    pub fn room_id(&self) -> Option<&str> {
        match &self.phase {
            SyncPhase::Disconnected => None,
            SyncPhase::Joining { room_id } | SyncPhase::Joined { room_id } => Some(room_id),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Language tags the server accepts, as announced in the last snapshot.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Start joining `room_id`. Any previous room is dropped together with its
    /// unsent edits; the server leaves it on our behalf.
    pub fn request_join(&mut self, room_id: &str, display_name: &str) {
        self.reset();
        self.display_name = display_name.to_string();
        self.phase = SyncPhase::Joining { room_id: room_id.to_string() };
        self.pending.push_back(ReceivedMessage::JoinRoom(JoinRoomMessage {
            room_id: room_id.to_string(),
            display_name: display_name.to_string(),
        }));
    }

    /// Leave the room. Unsent edits are discarded and the returned frame
    /// should be sent in their place.
    pub fn leave(&mut self) -> Option<ReceivedMessage> {
        let room_id = self.room_id()?.to_string();
        let frame = ReceivedMessage::LeaveRoom(LeaveRoomMessage {
            room_id,
            display_name: self.display_name.clone(),
        });
        self.reset();
        Some(frame)
    }

    /// The transport went away.
    pub fn connection_lost(&mut self) {
        self.reset();
    }

    /// Apply a local buffer edit. Returns false if the text was unchanged.
    pub fn edit_buffer(&mut self, text: &str) -> Result<bool, ClientError> {
        let room_id = self.joined_room()?;
        if self.buffer == text {
            return Ok(false);
        }
        self.buffer = text.to_string();
        self.queue(ReceivedMessage::CodeChange(CodeChangeMessage {
            buffer: text.to_string(),
            room_id,
        }));
        Ok(true)
    }

    /// Apply a local language switch. Unknown tags are refused without
    /// touching the mirror, so our view never diverges from the room's.
    pub fn edit_language(&mut self, tag: &str) -> Result<bool, ClientError> {
        let room_id = self.joined_room()?;
        if !self.languages.iter().any(|t| t == tag) {
            return Err(ClientError::InvalidLanguage(tag.to_string()));
        }
        if self.language == tag {
            return Ok(false);
        }
        self.language = tag.to_string();
        self.queue(ReceivedMessage::LanguageChange(LanguageChangeMessage {
            language: tag.to_string(),
            room_id,
        }));
        Ok(true)
    }

    /// Frames waiting to be transmitted, oldest first.
    pub fn take_pending(&mut self) -> Vec<ReceivedMessage> {
        self.pending.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Reconcile one inbound frame.
    pub fn apply(&mut self, message: &SendMessage) -> Applied {
        match message {
            SendMessage::RoomSnapshot(snapshot) => {
                if self.room_id() != Some(snapshot.room_id.as_str()) {
                    return Applied::Ignored;
                }
                self.buffer = snapshot.buffer.clone();
                self.language = snapshot.language.clone();
                self.roster = snapshot.users.clone();
                self.languages = snapshot.languages.clone();
                self.phase = SyncPhase::Joined { room_id: snapshot.room_id.clone() };
                Applied::Joined
            }
            SendMessage::CodeChange(m) if self.is_joined_to(&m.room_id) => {
                self.buffer = m.buffer.clone();
                Applied::Buffer
            }
            SendMessage::LanguageChange(m) if self.is_joined_to(&m.room_id) => {
                self.language = m.language.clone();
                Applied::Language
            }
            SendMessage::UpdateUsers(m) if self.is_joined_to(&m.room_id) => {
                self.roster = m.users.clone();
                Applied::Roster
            }
            SendMessage::Error(e) => {
                let refused_join = matches!(
                    (&self.phase, e.room_id.as_deref()),
                    (SyncPhase::Joining { room_id }, Some(refused)) if room_id == refused
                );
                if refused_join {
                    self.reset();
                }
                Applied::Rejected(e.clone())
            }
            SendMessage::Pong(_) => Applied::Pong,
            _ => Applied::Ignored,
        }
    }

    fn is_joined_to(&self, room_id: &str) -> bool {
        matches!(&self.phase, SyncPhase::Joined { room_id: current } if current == room_id)
    }

    fn joined_room(&self) -> Result<String, ClientError> {
        match &self.phase {
            SyncPhase::Joined { room_id } => Ok(room_id.clone()),
            _ => Err(ClientError::NotJoined),
        }
    }

    /// Queue a frame, collapsing it into an unsent frame of the same kind so
    /// only the latest value of a burst goes out.
    fn queue(&mut self, frame: ReceivedMessage) {
        let supersedes = matches!(
            (self.pending.back(), &frame),
            (Some(ReceivedMessage::CodeChange(_)), ReceivedMessage::CodeChange(_))
                | (Some(ReceivedMessage::LanguageChange(_)), ReceivedMessage::LanguageChange(_))
        );
        if supersedes {
            self.pending.pop_back();
        }
        self.pending.push_back(frame);
    }

    fn reset(&mut self) {
        self.phase = SyncPhase::Disconnected;
        self.buffer.clear();
        self.language.clear();
        self.roster.clear();
        self.languages.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoomSnapshot, UpdateUsersMessage};

    fn snapshot(room_id: &str, buffer: &str, users: &[&str]) -> SendMessage {
        SendMessage::RoomSnapshot(RoomSnapshot {
            room_id: room_id.to_string(),
            buffer: buffer.to_string(),
            language: "javascript".to_string(),
            users: users.iter().map(|u| u.to_string()).collect(),
            languages: vec!["javascript".to_string(), "python".to_string()],
        })
    }

    fn joined(room_id: &str) -> ClientSyncState {
        let mut state = ClientSyncState::new();
        state.request_join(room_id, "Alice");
        state.take_pending();
        assert_eq!(state.apply(&snapshot(room_id, "", &["Alice"])), Applied::Joined);
        state
    }

    fn code(room_id: &str, text: &str) -> SendMessage {
        SendMessage::CodeChange(CodeChangeMessage {
            buffer: text.to_string(),
            room_id: room_id.to_string(),
        })
    }

    #[test]
    fn join_walks_disconnected_joining_joined() {
        let mut state = ClientSyncState::new();
        assert_eq!(state.phase(), &SyncPhase::Disconnected);

        state.request_join("r1", "Alice");
        assert_eq!(state.phase(), &SyncPhase::Joining { room_id: "r1".to_string() });
        assert_eq!(
            state.take_pending(),
            vec![ReceivedMessage::JoinRoom(JoinRoomMessage {
                room_id: "r1".to_string(),
                display_name: "Alice".to_string(),
            })]
        );

        // Room events before the snapshot are not ours to apply yet
        assert_eq!(state.apply(&code("r1", "early")), Applied::Ignored);
        assert_eq!(state.apply(&snapshot("r1", "print(1)", &["Bob", "Alice"])), Applied::Joined);
        assert!(state.is_joined());
        assert_eq!(state.buffer(), "print(1)");
        assert_eq!(state.roster(), &["Bob".to_string(), "Alice".to_string()]);
    }

    #[test]
    fn inbound_events_overwrite_unconditionally() {
        let mut state = joined("r1");
        state.edit_buffer("local").unwrap();

        assert_eq!(state.apply(&code("r1", "T1")), Applied::Buffer);
        assert_eq!(state.apply(&code("r1", "T2")), Applied::Buffer);
        assert_eq!(state.buffer(), "T2");

        let lang = SendMessage::LanguageChange(LanguageChangeMessage {
            language: "python".to_string(),
            room_id: "r1".to_string(),
        });
        assert_eq!(state.apply(&lang), Applied::Language);
        assert_eq!(state.language(), "python");

        let users = SendMessage::UpdateUsers(UpdateUsersMessage {
            room_id: "r1".to_string(),
            users: vec!["Alice".to_string(), "Bob".to_string()],
        });
        assert_eq!(state.apply(&users), Applied::Roster);
        assert_eq!(state.roster().len(), 2);
    }

    #[test]
    fn events_for_other_rooms_are_ignored() {
        let mut state = joined("r2");
        assert_eq!(state.apply(&code("r1", "stale")), Applied::Ignored);
        assert_eq!(state.buffer(), "");
    }

    #[test]
    fn local_edits_apply_at_once_and_coalesce() {
        let mut state = joined("r1");

        assert!(state.edit_buffer("a").unwrap());
        assert!(state.edit_buffer("ab").unwrap());
        assert!(!state.edit_buffer("ab").unwrap());
        assert_eq!(state.buffer(), "ab");
        assert!(state.edit_language("python").unwrap());
        assert!(state.edit_buffer("abc").unwrap());

        assert_eq!(
            state.take_pending(),
            vec![
                ReceivedMessage::CodeChange(CodeChangeMessage {
                    buffer: "ab".to_string(),
                    room_id: "r1".to_string(),
                }),
                ReceivedMessage::LanguageChange(LanguageChangeMessage {
                    language: "python".to_string(),
                    room_id: "r1".to_string(),
                }),
                ReceivedMessage::CodeChange(CodeChangeMessage {
                    buffer: "abc".to_string(),
                    room_id: "r1".to_string(),
                }),
            ]
        );
        assert!(!state.has_pending());
    }

    #[test]
    fn unknown_language_leaves_view_unchanged() {
        let mut state = joined("r1");
        assert!(matches!(
            state.edit_language("cobol"),
            Err(ClientError::InvalidLanguage(tag)) if tag == "cobol"
        ));
        assert_eq!(state.language(), "javascript");
        assert!(!state.has_pending());
    }

    #[test]
    fn edits_require_a_joined_room() {
        let mut state = ClientSyncState::new();
        assert!(matches!(state.edit_buffer("x"), Err(ClientError::NotJoined)));
        state.request_join("r1", "Alice");
        assert!(matches!(state.edit_buffer("x"), Err(ClientError::NotJoined)));
    }

    #[test]
    fn leave_discards_unsent_edits() {
        let mut state = joined("r1");
        state.edit_buffer("unsent").unwrap();

        let frame = state.leave();
        assert_eq!(
            frame,
            Some(ReceivedMessage::LeaveRoom(LeaveRoomMessage {
                room_id: "r1".to_string(),
                display_name: "Alice".to_string(),
            }))
        );
        assert_eq!(state.phase(), &SyncPhase::Disconnected);
        assert!(state.take_pending().is_empty());
        assert_eq!(state.buffer(), "");
        assert_eq!(state.leave(), None);
    }

    #[test]
    fn connection_loss_resets_mirror() {
        let mut state = joined("r1");
        state.edit_buffer("unsent").unwrap();
        state.connection_lost();
        assert_eq!(state.phase(), &SyncPhase::Disconnected);
        assert!(!state.has_pending());
        assert_eq!(state.apply(&code("r1", "late")), Applied::Ignored);
    }

    #[test]
    fn refused_join_returns_to_disconnected() {
        let mut state = ClientSyncState::new();
        state.request_join(" ", "Alice");
        let refusal = ErrorMessage {
            code: "invalid-room".to_string(),
            message: "Invalid room id ' '".to_string(),
            room_id: Some(" ".to_string()),
        };
        assert_eq!(state.apply(&SendMessage::Error(refusal.clone())), Applied::Rejected(refusal));
        assert_eq!(state.phase(), &SyncPhase::Disconnected);
    }
}
