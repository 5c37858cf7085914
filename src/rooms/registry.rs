use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::models::{CodeChangeMessage, LanguageChangeMessage, RoomSnapshot, SendMessage};
use super::error::SyncError;
use super::language::LanguageSet;
use super::presence::PresenceTracker;
use super::room::{ConnectionId, Participant, Room};
use super::router::{BroadcastRouter, Outbox, RouterStats};

/// Resolves when the registry has evicted the connection and its transport
/// should be closed.
pub type Eviction = oneshot::Receiver<()>;

#[derive(Debug)]
struct ConnectionEntry {
    outbox: Outbox,
    room: Option<String>,
    evict: oneshot::Sender<()>,
}

/// Counters exposed through diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub connections: usize,
    pub rooms: usize,
    pub participants: usize,
    pub router: RouterStats,
}

/// Owner of every room's authoritative state.
///
/// Each room sits behind its own lock. Mutations and the fan-out they trigger
/// happen under that lock, so a room's events reach every member in one total
/// order while separate rooms proceed independently. Membership in the
/// connection table is updated under the same room lock.
///
/// Lock order is room, then the room map, then the connection table. Nothing
/// waits on a room lock while holding the map or the table.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Arc<Mutex<Room>>>>,
    connections: Mutex<HashMap<ConnectionId, ConnectionEntry>>,
    languages: LanguageSet,
    router: BroadcastRouter,
}

impl RoomRegistry {
    pub fn new(languages: LanguageSet) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            connections: Mutex::new(HashMap::new()),
            languages,
            router: BroadcastRouter::new(),
        }
    }

    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    pub fn router(&self) -> &BroadcastRouter {
        &self.router
    }

    /// Make a transport endpoint known to the registry. Events for the
    /// connection are pushed into `outbox`.
    ///
    /// The returned [`Eviction`] fires if the connection is reaped after a
    /// failed delivery. By then it has left its room and been forgotten, so
    /// the transport should be closed.
    pub async fn register_connection(&self, connection_id: ConnectionId, outbox: Outbox) -> Eviction {
        let (evict, eviction) = oneshot::channel();
        self.connections.lock().await.insert(
            connection_id,
            ConnectionEntry { outbox, room: None, evict },
        );
        debug!("Connection {} registered", connection_id);
        eviction
    }

    /// Forget a connection and leave whatever room it was in. Safe to call
    /// more than once.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let entry = self.connections.lock().await.remove(&connection_id);
        let Some(entry) = entry else {
            return;
        };
        if let Some(room_id) = entry.room {
            info!("Connection {} dropped, leaving room {}", connection_id, room_id);
            self.leave(&room_id, connection_id).await;
        }
    }

    /// Send a reply to one connection outside of any room fan-out.
    pub async fn send_to(&self, connection_id: ConnectionId, message: SendMessage) -> Result<(), SyncError> {
        let outbox = self
            .connections
            .lock()
            .await
            .get(&connection_id)
            .map(|entry| entry.outbox.clone())
            .ok_or(SyncError::UnknownConnection(connection_id))?;
        self.router.send(connection_id, &outbox, message)
    }

    /// Room the connection currently belongs to.
    pub async fn room_of(&self, connection_id: ConnectionId) -> Option<String> {
        self.connections
            .lock()
            .await
            .get(&connection_id)
            .and_then(|entry| entry.room.clone())
    }

    /// Join `room_id`, creating it if needed, and leave any other room the
    /// connection was in. Re-joining renames the participant in place.
    ///
    /// The joiner receives the snapshot before any other event of the room,
    /// then every member receives the new roster.
    pub async fn join(
        &self,
        room_id: &str,
        connection_id: ConnectionId,
        display_name: &str,
    ) -> Result<RoomSnapshot, SyncError> {
        if room_id.trim().is_empty() {
            return Err(SyncError::InvalidRoomId(room_id.to_string()));
        }
        let (outbox, previous) = {
            let connections = self.connections.lock().await;
            let entry = connections
                .get(&connection_id)
                .ok_or(SyncError::UnknownConnection(connection_id))?;
            (entry.outbox.clone(), entry.room.clone())
        };

        if let Some(previous) = previous.filter(|p| p != room_id) {
            info!("Connection {} switching from room {} to {}", connection_id, previous, room_id);
            self.leave(&previous, connection_id).await;
        }

        loop {
            let handle = self.room_or_create(room_id).await;
            let mut room = handle.lock().await;
            if room.is_closed() {
                // Emptied between lookup and lock; retry against a fresh room.
                continue;
            }

            let participant = Participant {
                connection_id,
                display_name: display_name.to_string(),
                outbox: outbox.clone(),
            };
            if room.upsert(participant.clone()) {
                info!("{} joined room {} ({} present)", display_name, room_id, room.participants().len());
            } else {
                info!("{} re-joined room {}", display_name, room_id);
            }

            let snapshot = self.snapshot_of(&room);
            let mut failed = Vec::new();
            if self.router.deliver(&participant, SendMessage::RoomSnapshot(snapshot.clone())).is_err() {
                failed.push(connection_id);
            }
            failed.extend(self.publish_roster(&room));
            self.settle(&mut room, failed).await;

            if room.contains(connection_id) {
                self.set_membership(connection_id, Some(room_id)).await;
            }
            return Ok(snapshot);
        }
    }

    /// Remove the connection from the room. Absent members and missing rooms
    /// are ignored. An emptied room is discarded.
    pub async fn leave(&self, room_id: &str, connection_id: ConnectionId) {
        let Some(handle) = self.find_room(room_id).await else {
            self.forget_membership(room_id, connection_id).await;
            return;
        };
        let mut room = handle.lock().await;
        if !room.is_closed() && room.remove(connection_id) {
            info!("Connection {} left room {}", connection_id, room_id);
            let failed = if room.is_empty() { Vec::new() } else { self.publish_roster(&room) };
            self.settle(&mut room, failed).await;
        }
        self.forget_membership(room_id, connection_id).await;
    }

    /// Overwrite the room's buffer and broadcast it to everyone but `origin`.
    ///
    /// Returns `Ok(false)` when the room does not exist, and `NotMember` when
    /// `origin` is not in the room.
    pub async fn set_buffer(
        &self,
        room_id: &str,
        text: &str,
        origin: Option<ConnectionId>,
    ) -> Result<bool, SyncError> {
        let message = SendMessage::CodeChange(CodeChangeMessage {
            buffer: text.to_string(),
            room_id: room_id.to_string(),
        });
        self.mutate(room_id, origin, message, |room| room.set_buffer(text.to_string()))
            .await
    }

    /// Overwrite the room's language and broadcast it to everyone but `origin`.
    ///
    /// Unknown tags fail with `InvalidLanguage` and leave the room untouched.
    /// Returns `Ok(false)` when the room does not exist, and `NotMember` when
    /// `origin` is not in the room.
    pub async fn set_language(
        &self,
        room_id: &str,
        tag: &str,
        origin: Option<ConnectionId>,
    ) -> Result<bool, SyncError> {
        if !self.languages.contains(tag) {
            return Err(SyncError::InvalidLanguage(tag.to_string()));
        }
        let message = SendMessage::LanguageChange(LanguageChangeMessage {
            language: tag.to_string(),
            room_id: room_id.to_string(),
        });
        self.mutate(room_id, origin, message, |room| room.set_language(tag.to_string()))
            .await
    }

    /// Deliver an arbitrary event to the room's members, skipping `exclude`.
    /// Returns false when the room does not exist.
    pub async fn publish(&self, room_id: &str, message: SendMessage, exclude: Option<ConnectionId>) -> bool {
        let Some(handle) = self.find_room(room_id).await else {
            return false;
        };
        let mut room = handle.lock().await;
        if room.is_closed() {
            return false;
        }
        let failed = self.router.publish(&room, &message, exclude);
        self.settle(&mut room, failed).await;
        true
    }

    /// Display names in join order; empty for a missing room.
    pub async fn roster(&self, room_id: &str) -> Vec<String> {
        match self.find_room(room_id).await {
            Some(handle) => PresenceTracker::compute(&*handle.lock().await),
            None => Vec::new(),
        }
    }

    pub async fn snapshot(&self, room_id: &str) -> Option<RoomSnapshot> {
        let handle = self.find_room(room_id).await?;
        let room = handle.lock().await;
        if room.is_closed() {
            return None;
        }
        Some(self.snapshot_of(&room))
    }

    pub async fn stats(&self) -> RegistryStats {
        let handles: Vec<Arc<Mutex<Room>>> = self.rooms.read().await.values().cloned().collect();
        let mut participants = 0;
        for handle in &handles {
            participants += handle.lock().await.participants().len();
        }
        RegistryStats {
            connections: self.connections.lock().await.len(),
            rooms: handles.len(),
            participants,
            router: self.router.stats(),
        }
    }

    async fn mutate(
        &self,
        room_id: &str,
        origin: Option<ConnectionId>,
        message: SendMessage,
        apply: impl FnOnce(&mut Room),
    ) -> Result<bool, SyncError> {
        let Some(handle) = self.find_room(room_id).await else {
            debug!("Room {} not found, update dropped", room_id);
            return Ok(false);
        };
        let mut room = handle.lock().await;
        if room.is_closed() {
            debug!("Room {} already closed, update dropped", room_id);
            return Ok(false);
        }
        if let Some(origin) = origin.filter(|id| !room.contains(*id)) {
            return Err(SyncError::NotMember {
                room_id: room_id.to_string(),
                connection_id: origin,
            });
        }
        apply(&mut *room);
        let failed = self.router.publish(&room, &message, origin);
        self.settle(&mut room, failed).await;
        Ok(true)
    }

    fn publish_roster(&self, room: &Room) -> Vec<ConnectionId> {
        let roster = SendMessage::UpdateUsers(PresenceTracker::roster_message(room));
        self.router.publish(room, &roster, None)
    }

    /// Reap connections whose delivery failed, telling the remaining members
    /// about each roster change, until a publish round succeeds everywhere.
    /// Reaped connections are evicted from the registry. Closes the room if
    /// it ends up empty.
    async fn settle(&self, room: &mut Room, mut failed: Vec<ConnectionId>) {
        let mut reaped = Vec::new();
        loop {
            failed.retain(|id| room.remove(*id));
            if failed.is_empty() {
                break;
            }
            for id in &failed {
                warn!("Reaping unreachable connection {} from room {}", id, room.id());
            }
            reaped.append(&mut failed);
            if room.is_empty() {
                break;
            }
            failed = self.publish_roster(room);
        }

        if room.is_empty() {
            room.close();
            self.rooms.write().await.remove(room.id());
            info!("Room {} is empty and was discarded", room.id());
        }
        self.evict(&reaped).await;
    }

    /// Forget reaped connections and signal their transports to close.
    async fn evict(&self, connection_ids: &[ConnectionId]) {
        if connection_ids.is_empty() {
            return;
        }
        let mut connections = self.connections.lock().await;
        for id in connection_ids {
            let Some(entry) = connections.remove(id) else {
                continue;
            };
            if entry.evict.send(()).is_err() {
                debug!("Connection {} no longer listens for eviction", id);
            }
        }
    }

    fn snapshot_of(&self, room: &Room) -> RoomSnapshot {
        RoomSnapshot {
            room_id: room.id().to_string(),
            buffer: room.buffer().to_string(),
            language: room.language().to_string(),
            users: PresenceTracker::compute(room),
            languages: self.languages.tags().to_vec(),
        }
    }

    async fn find_room(&self, room_id: &str) -> Option<Arc<Mutex<Room>>> {
        self.rooms.read().await.get(room_id).cloned()
    }

    async fn room_or_create(&self, room_id: &str) -> Arc<Mutex<Room>> {
        if let Some(handle) = self.find_room(room_id).await {
            return handle;
        }
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                info!("Creating room {}", room_id);
                Arc::new(Mutex::new(Room::new(room_id, self.languages.default_tag())))
            })
            .clone()
    }

    async fn set_membership(&self, connection_id: ConnectionId, room_id: Option<&str>) {
        if let Some(entry) = self.connections.lock().await.get_mut(&connection_id) {
            entry.room = room_id.map(str::to_string);
        }
    }

    /// Clear the connection's room pointer if it still names `room_id`.
    async fn forget_membership(&self, room_id: &str, connection_id: ConnectionId) {
        if let Some(entry) = self.connections.lock().await.get_mut(&connection_id) {
            if entry.room.as_deref() == Some(room_id) {
                entry.room = None;
            }
        }
    }
}
