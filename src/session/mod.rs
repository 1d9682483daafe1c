//! Session tokens and the store interface the engine writes to.

pub mod store;
pub mod types;

pub use store::{MemorySession, SessionStore};
pub use types::{SessionToken, TokenOrigin};
