//! System orchestration, startup, and shutdown logic.

pub mod register_system;
pub mod tracing;
pub mod error;

pub use register_system::*;
pub use self::tracing::*;
pub use error::*;
