//! Cryptographically random session token generation.

use rand::RngCore;
use rand::rngs::OsRng;

use sessionvault_core::config::SessionConfig;
use sessionvault_core::config::session::MIN_TOKEN_BYTES;
use sessionvault_core::error::{AppError, ErrorKind};
use sessionvault_entity::session::SessionToken;

/// Produces unguessable, fixed-length, lowercase-hex session tokens.
///
/// Bytes come straight from the operating system CSPRNG on every call;
/// nothing is cached or derived from earlier outputs.
#[derive(Debug, Clone, Copy)]
pub struct TokenGenerator {
    bytes: usize,
}

impl TokenGenerator {
    /// Creates a generator producing `bytes` random bytes per token.
    ///
    /// Sizes below 16 bytes are raised to 16.
    pub fn new(bytes: usize) -> Self {
        Self {
            bytes: bytes.max(MIN_TOKEN_BYTES),
        }
    }

    /// Creates a generator from the session policy.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.token_bytes)
    }

    /// Generates a new token.
    ///
    /// Fails only when the OS randomness source fails, which is reported
    /// as [`ErrorKind::EntropyUnavailable`] and must be treated as fatal.
    pub fn generate(&self) -> Result<SessionToken, AppError> {
        let mut buf = vec![0u8; self.bytes];
        OsRng.try_fill_bytes(&mut buf).map_err(|e| {
            AppError::with_source(
                ErrorKind::EntropyUnavailable,
                "Operating system randomness source failed",
                e,
            )
        })?;
        Ok(SessionToken::new(hex::encode(buf)))
    }

    /// Entropy carried by every generated token.
    pub fn entropy_bits(&self) -> usize {
        self.bytes * 8
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new(MIN_TOKEN_BYTES)
    }
}
