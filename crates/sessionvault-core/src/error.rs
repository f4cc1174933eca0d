//! Unified application error types for SessionVault.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. A missing or expired session is
//! **not** an error; it is reported as `None` by the store and as
//! "not active" by the manager.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The backing store could not be reached, failed an I/O operation,
    /// or did not answer within its timeout.
    StorageUnavailable,
    /// A freshly generated token collided with an active session.
    ///
    /// Retried by the session manager and never surfaced by its operations.
    DuplicateToken,
    /// Token generation kept colliding until the retry budget ran out.
    ExhaustedRetries,
    /// The operating system randomness source failed.
    EntropyUnavailable,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred (e.g. a corrupt row).
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageUnavailable => write!(f, "STORAGE_UNAVAILABLE"),
            Self::DuplicateToken => write!(f, "DUPLICATE_TOKEN"),
            Self::ExhaustedRetries => write!(f, "EXHAUSTED_RETRIES"),
            Self::EntropyUnavailable => write!(f, "ENTROPY_UNAVAILABLE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout SessionVault.
///
/// Messages name the failing operation and never carry token values.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a storage-unavailable error.
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageUnavailable, message)
    }

    /// Create a duplicate-token error.
    pub fn duplicate_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateToken, message)
    }

    /// Create an exhausted-retries error.
    pub fn exhausted_retries(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExhaustedRetries, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether the error is a token collision.
    pub fn is_duplicate_token(&self) -> bool {
        self.kind == ErrorKind::DuplicateToken
    }

    /// Whether the process should stop issuing sessions after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::EntropyUnavailable | ErrorKind::Configuration
        )
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(
            ErrorKind::StorageUnavailable,
            format!("I/O error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
