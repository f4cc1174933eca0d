//! Session lifecycle management including creation, validation, renewal,
//! termination, and cleanup of expired records.

pub mod cleanup;
pub mod manager;
pub mod memory;
pub mod store;

pub use cleanup::SessionCleanup;
pub use manager::SessionManager;
pub use memory::MemorySessionStore;
pub use store::{DatabaseSessionStore, SessionStore};
