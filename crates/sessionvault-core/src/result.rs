//! Convenience result type alias for SessionVault.

use crate::error::AppError;

/// A specialized `Result` type for SessionVault operations.
pub type AppResult<T> = Result<T, AppError>;
