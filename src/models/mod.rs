pub mod health;
pub mod diagnostics;
pub mod messages;
pub mod room;
pub mod error;

pub use health::*;
pub use diagnostics::*;
pub use messages::*;
pub use room::*;
pub use error::*;
