pub mod health;
pub mod rooms;
pub mod diagnostics;

pub use health::*;
pub use rooms::*;
pub use diagnostics::*;
