//! # sessionvault-database
//!
//! SQLite connection management, schema migrations, and the session
//! repository.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::session::SessionRepository;
