//! Opaque session token value type.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Longest token accepted from a caller.
pub const MAX_PRESENTED_LEN: usize = 256;

/// Hex characters kept from the SHA-256 digest in a fingerprint.
const FINGERPRINT_LEN: usize = 12;

/// The opaque value exchanged with the caller.
///
/// `Debug` is redacted so that tokens cannot leak through `{:?}` in logs
/// or error chains. Use [`SessionToken::fingerprint`] when a log line
/// needs to correlate events for the same session.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a token produced by the generator or read from storage.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Accepts a token presented by a caller (cookie, header, CLI arg).
    ///
    /// Returns `None` for values no generator could have produced: empty,
    /// longer than [`MAX_PRESENTED_LEN`], or containing whitespace or
    /// control characters. Such values are treated as "no token".
    pub fn parse(presented: &str) -> Option<Self> {
        if presented.is_empty() || presented.len() > MAX_PRESENTED_LEN {
            return None;
        }
        if !presented.chars().all(|c| c.is_ascii_graphic()) {
            return None;
        }
        Some(Self(presented.to_string()))
    }

    /// The raw token. Hand this to the caller; never log it.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper, returning the raw token.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Short SHA-256 prefix that identifies the token in logs.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        let mut fp = hex::encode(digest);
        fp.truncate(FINGERPRINT_LEN);
        fp
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({}…)", self.fingerprint())
    }
}
