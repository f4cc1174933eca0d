//! Expired session cleanup.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, error, info};

use sessionvault_core::config::ReaperConfig;
use sessionvault_core::error::AppError;

use super::store::SessionStore;

/// Handles periodic deletion of expired session records.
///
/// Purely housekeeping: the store already treats expired records as
/// absent, so a cleanup that never runs only costs disk space.
#[derive(Clone)]
pub struct SessionCleanup {
    /// Session store to purge.
    session_store: Arc<dyn SessionStore>,
    /// How long an expired record is kept before deletion.
    grace: Duration,
}

impl std::fmt::Debug for SessionCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCleanup")
            .field("grace", &self.grace)
            .finish()
    }
}

impl SessionCleanup {
    /// Creates a new session cleanup handler.
    pub fn new(session_store: Arc<dyn SessionStore>, grace: Duration) -> Self {
        Self {
            session_store,
            grace: grace.max(Duration::zero()),
        }
    }

    /// Creates a cleanup handler using the reaper's grace period.
    pub fn from_config(session_store: Arc<dyn SessionStore>, config: &ReaperConfig) -> Self {
        Self::new(session_store, config.grace())
    }

    /// Runs a cleanup cycle.
    ///
    /// Returns the number of records removed.
    pub async fn run_cleanup(&self) -> Result<u64, AppError> {
        let removed = self
            .session_store
            .purge_expired(self.grace)
            .await
            .inspect_err(|e| error!(error = %e, "Session cleanup failed"))?;

        if removed == 0 {
            debug!("No expired sessions to clean up");
            return Ok(0);
        }

        let remaining = self.session_store.count_active().await.unwrap_or_default();
        info!(removed, remaining, "Expired sessions cleaned up");
        Ok(removed)
    }
}
