//! # sessionvault-core
//!
//! Core crate for SessionVault. Contains the configuration schema, the
//! clock abstraction used by session stores, and the unified error system.
//!
//! This crate has **no** internal dependencies on other SessionVault crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
