//! # sessionvault-auth
//!
//! Session token lifecycle for SessionVault.
//!
//! ## Modules
//!
//! - `token` — cryptographically random session token generation
//! - `session` — the session store contract and its backends, the session
//!   manager (start / validate / renew / end), and expired-session cleanup

pub mod session;
pub mod token;

pub use session::{
    DatabaseSessionStore, MemorySessionStore, SessionCleanup, SessionManager, SessionStore,
};
pub use token::TokenGenerator;
