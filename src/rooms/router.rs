use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

use crate::models::SendMessage;
use super::error::SyncError;
use super::room::{ConnectionId, Participant, Room};

/// Outbound queue of one connection. A writer task drains it onto the socket.
pub type Outbox = mpsc::Sender<SendMessage>;

/// Delivery counters, read by the diagnostics endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub delivered: u64,
    pub dropped: u64,
}

/// Fans room events out to member outboxes.
///
/// Sends never wait: a full or closed outbox is reported back as a failed
/// connection and the caller reaps it. Callers hold the room lock while
/// publishing, so every member sees one room's events in the same order.
#[derive(Debug, Default)]
pub struct BroadcastRouter {
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl BroadcastRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `message` to every member of `room` except `exclude`.
    ///
    /// Returns the connections whose delivery failed. A failure never stops
    /// delivery to the remaining members.
    pub fn publish(
        &self,
        room: &Room,
        message: &SendMessage,
        exclude: Option<ConnectionId>,
    ) -> Vec<ConnectionId> {
        room.participants()
            .iter()
            .filter(|p| Some(p.connection_id) != exclude)
            .filter_map(|p| self.deliver(p, message.clone()).err().map(|_| p.connection_id))
            .collect()
    }

    /// Deliver a single message to one participant.
    pub fn deliver(&self, participant: &Participant, message: SendMessage) -> Result<(), SyncError> {
        self.send(participant.connection_id, &participant.outbox, message)
    }

    /// Deliver straight to an outbox, for replies to a connection that may not
    /// be in any room.
    pub fn send(
        &self,
        connection_id: ConnectionId,
        outbox: &Outbox,
        message: SendMessage,
    ) -> Result<(), SyncError> {
        match outbox.try_send(message) {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                let reason = match e {
                    TrySendError::Full(_) => "outbox full",
                    TrySendError::Closed(_) => "connection closed",
                };
                warn!("Delivery to connection {} failed: {}", connection_id, reason);
                Err(SyncError::DeliveryFailure {
                    connection_id,
                    reason: reason.to_string(),
                })
            }
        }
    }

    pub fn stats(&self) -> RouterStats {
        RouterStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CodeChangeMessage;
    use tokio::sync::mpsc::Receiver;
    use uuid::Uuid;

    fn member(room: &mut Room, name: &str, capacity: usize) -> (ConnectionId, Receiver<SendMessage>) {
        let (outbox, rx) = mpsc::channel(capacity);
        let connection_id = Uuid::new_v4();
        room.upsert(Participant {
            connection_id,
            display_name: name.to_string(),
            outbox,
        });
        (connection_id, rx)
    }

    fn code(text: &str) -> SendMessage {
        SendMessage::CodeChange(CodeChangeMessage {
            buffer: text.to_string(),
            room_id: "r1".to_string(),
        })
    }

    #[test]
    fn publish_skips_excluded_connection() {
        let mut room = Room::new("r1", "javascript");
        let (alice, mut alice_rx) = member(&mut room, "Alice", 4);
        let (_bob, mut bob_rx) = member(&mut room, "Bob", 4);

        let router = BroadcastRouter::new();
        let failed = router.publish(&room, &code("print(1)"), Some(alice));

        assert!(failed.is_empty());
        assert!(alice_rx.try_recv().is_err());
        assert_eq!(bob_rx.try_recv().unwrap(), code("print(1)"));
        assert_eq!(router.stats(), RouterStats { delivered: 1, dropped: 0 });
    }

    #[test]
    fn failed_recipient_does_not_block_others() {
        let mut room = Room::new("r1", "javascript");
        let (gone, gone_rx) = member(&mut room, "Gone", 4);
        let (_full, mut full_rx) = member(&mut room, "Full", 1);
        let (_ok, mut ok_rx) = member(&mut room, "Ok", 4);
        drop(gone_rx);

        let router = BroadcastRouter::new();
        assert_eq!(router.publish(&room, &code("a"), None), vec![gone]);
        let failed = router.publish(&room, &code("b"), None);

        assert_eq!(failed.len(), 2);
        assert_eq!(ok_rx.try_recv().unwrap(), code("a"));
        assert_eq!(ok_rx.try_recv().unwrap(), code("b"));
        assert_eq!(full_rx.try_recv().unwrap(), code("a"));
        assert_eq!(router.stats(), RouterStats { delivered: 3, dropped: 3 });
    }
}
