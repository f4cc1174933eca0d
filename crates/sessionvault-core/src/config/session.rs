//! Session issuing policy configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Smallest accepted token size in bytes (128 bits of entropy).
pub const MIN_TOKEN_BYTES: usize = 16;

/// Longest accepted session lifetime (one hundred years).
pub const MAX_TTL_MINUTES: u64 = 525_600 * 100;

/// Session issuing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Fixed session lifetime in minutes, counted from creation or the
    /// last explicit renewal. Validation never extends it.
    #[serde(default = "default_ttl")]
    pub ttl_minutes: u64,
    /// Number of random bytes per token (hex-encoded to twice as many chars).
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
    /// How many freshly generated tokens to try before giving up.
    #[serde(default = "default_max_insert_attempts")]
    pub max_insert_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_ttl(),
            token_bytes: default_token_bytes(),
            max_insert_attempts: default_max_insert_attempts(),
        }
    }
}

impl SessionConfig {
    /// Session lifetime as a [`chrono::Duration`], capped at [`MAX_TTL_MINUTES`].
    pub fn ttl(&self) -> Duration {
        Duration::minutes(self.ttl_minutes.min(MAX_TTL_MINUTES) as i64)
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if self.ttl_minutes == 0 {
            return Err(AppError::configuration(
                "session.ttl_minutes must be positive",
            ));
        }
        if self.ttl_minutes > MAX_TTL_MINUTES {
            return Err(AppError::configuration(format!(
                "session.ttl_minutes must be at most {MAX_TTL_MINUTES}"
            )));
        }
        if self.token_bytes < MIN_TOKEN_BYTES {
            return Err(AppError::configuration(format!(
                "session.token_bytes must be at least {MIN_TOKEN_BYTES}"
            )));
        }
        if self.max_insert_attempts == 0 {
            return Err(AppError::configuration(
                "session.max_insert_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_ttl() -> u64 {
    30
}

fn default_token_bytes() -> usize {
    MIN_TOKEN_BYTES
}

fn default_max_insert_attempts() -> u32 {
    5
}
