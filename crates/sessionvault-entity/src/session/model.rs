//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::token::SessionToken;

/// A persisted session record.
///
/// Records are created on "start session", read on every validation and
/// deleted on "end session" or by the reaper once expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Surrogate identity assigned by storage, monotonically increasing.
    pub id: i64,
    /// The opaque value exchanged with the caller.
    pub token: SessionToken,
    /// Reserved external identity reference. Never populated by current policy.
    pub owner: Option<String>,
    /// When the session was created (store clock).
    pub created_at: DateTime<Utc>,
    /// When the session was last refreshed (store clock).
    pub updated_at: DateTime<Utc>,
    /// Absolute expiry. The session is invalid once the store clock reaches it.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is still valid at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Result of "start session".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedSession {
    /// Token the caller must hand to the client.
    pub token: SessionToken,
    /// Absolute expiry the client-side token should carry.
    pub expires_at: DateTime<Utc>,
    /// `false` when an already active session was returned unchanged.
    pub created: bool,
}

impl IssuedSession {
    /// Wraps a freshly inserted record.
    pub fn created(session: Session) -> Self {
        Self {
            token: session.token,
            expires_at: session.expires_at,
            created: true,
        }
    }

    /// Wraps an existing active record.
    pub fn reused(session: Session) -> Self {
        Self {
            token: session.token,
            expires_at: session.expires_at,
            created: false,
        }
    }
}

/// Outcome of validating a presented token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// The token maps to an unexpired record.
    Active(Session),
    /// No token, an unknown token, or an expired one. Not an error.
    NotActive,
}

impl SessionStatus {
    /// Whether the status is [`SessionStatus::Active`].
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// The active record, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Active(session) => Some(session),
            Self::NotActive => None,
        }
    }

    /// Consumes the status, returning the active record, if any.
    pub fn into_session(self) -> Option<Session> {
        match self {
            Self::Active(session) => Some(session),
            Self::NotActive => None,
        }
    }
}

impl From<Option<Session>> for SessionStatus {
    fn from(found: Option<Session>) -> Self {
        found.map_or(Self::NotActive, Self::Active)
    }
}
