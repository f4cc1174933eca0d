//! In-memory session store using a Tokio RwLock for single-process
//! deployments and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::RwLock;

use sessionvault_core::error::AppError;
use sessionvault_core::traits::{Clock, SystemClock};
use sessionvault_entity::session::{Session, SessionToken};

use super::store::{SessionStore, expiry_after, purge_cutoff};

/// Internal state for the memory-based store.
#[derive(Debug, Default)]
struct InnerState {
    /// Last identity handed out.
    last_id: i64,
    /// Records keyed by token.
    sessions: HashMap<SessionToken, Session>,
}

/// In-memory session store.
///
/// Records do not survive a restart. Uniqueness is enforced under the
/// write lock, so concurrent inserts of the same token cannot both win.
#[derive(Clone)]
pub struct MemorySessionStore {
    /// Protected inner state.
    state: Arc<RwLock<InnerState>>,
    /// Source of "now" for every validity decision.
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionStore").finish()
    }
}

impl MemorySessionStore {
    /// Creates an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store driven by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InnerState::default())),
            clock,
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn initialize(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn insert(&self, token: &SessionToken, ttl: Duration) -> Result<Session, AppError> {
        let now = self.clock.now();
        let expires_at = expiry_after(now, ttl)?;
        let mut state = self.state.write().await;

        if state
            .sessions
            .get(token)
            .is_some_and(|existing| existing.is_active_at(now))
        {
            return Err(AppError::duplicate_token(
                "Session token is held by an active session",
            ));
        }

        state.last_id += 1;
        let session = Session {
            id: state.last_id,
            token: token.clone(),
            owner: None,
            created_at: now,
            updated_at: now,
            expires_at,
        };
        state.sessions.insert(token.clone(), session.clone());
        Ok(session)
    }

    async fn find_active(&self, token: &SessionToken) -> Result<Option<Session>, AppError> {
        let now = self.clock.now();
        let state = self.state.read().await;
        Ok(state
            .sessions
            .get(token)
            .filter(|s| s.is_active_at(now))
            .cloned())
    }

    async fn refresh(
        &self,
        token: &SessionToken,
        ttl: Duration,
    ) -> Result<Option<Session>, AppError> {
        let now = self.clock.now();
        let expires_at = expiry_after(now, ttl)?;
        let mut state = self.state.write().await;
        match state.sessions.get_mut(token) {
            Some(session) if session.is_active_at(now) => {
                session.updated_at = now;
                session.expires_at = expires_at;
                Ok(Some(session.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), AppError> {
        self.state.write().await.sessions.remove(token);
        Ok(())
    }

    async fn purge_expired(&self, grace: Duration) -> Result<u64, AppError> {
        let cutoff = purge_cutoff(self.clock.now(), grace);
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.expires_at > cutoff);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn count_active(&self) -> Result<u64, AppError> {
        let now = self.clock.now();
        let state = self.state.read().await;
        Ok(state
            .sessions
            .values()
            .filter(|s| s.is_active_at(now))
            .count() as u64)
    }

    async fn list_active(&self, limit: u32) -> Result<Vec<Session>, AppError> {
        let now = self.clock.now();
        let state = self.state.read().await;
        let mut active: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.is_active_at(now))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.id.cmp(&a.id));
        active.truncate(limit as usize);
        Ok(active)
    }
}
