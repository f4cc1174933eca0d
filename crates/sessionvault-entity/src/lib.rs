//! Domain entities for SessionVault.

pub mod session;

pub use session::{Session, SessionToken};
