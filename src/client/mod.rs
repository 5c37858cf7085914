pub mod connection;
pub mod error;
pub mod sync_state;

pub use connection::{SyncClient, SyncEvent};
pub use error::ClientError;
pub use sync_state::{Applied, ClientSyncState, SyncPhase};
