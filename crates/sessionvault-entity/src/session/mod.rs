//! Session domain entities.

pub mod model;
pub mod token;

pub use model::{IssuedSession, Session, SessionStatus};
pub use token::SessionToken;
