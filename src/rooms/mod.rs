pub mod error;
pub mod language;
pub mod presence;
pub mod registry;
pub mod room;
pub mod router;

pub use error::SyncError;
pub use language::LanguageSet;
pub use presence::PresenceTracker;
pub use registry::{Eviction, RegistryStats, RoomRegistry};
pub use room::{ConnectionId, Participant, Room};
pub use router::{BroadcastRouter, Outbox, RouterStats};
