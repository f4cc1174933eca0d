//! Session lifecycle manager: start, validate, renew and end flows.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use sessionvault_core::config::SessionConfig;
use sessionvault_core::error::AppError;
use sessionvault_entity::session::{IssuedSession, Session, SessionStatus, SessionToken};

use crate::token::TokenGenerator;

use super::store::SessionStore;

/// Manages the complete session lifecycle.
///
/// Holds no mutable state of its own; clones share the same store and may
/// be used from any number of tasks at once.
#[derive(Clone)]
pub struct SessionManager {
    /// Session persistence.
    store: Arc<dyn SessionStore>,
    /// Token source for new sessions.
    generator: TokenGenerator,
    /// Session configuration.
    config: SessionConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("generator", &self.generator)
            .field("config", &self.config)
            .finish()
    }
}

impl SessionManager {
    /// Creates a session manager issuing tokens per `config`.
    pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
        Self {
            generator: TokenGenerator::from_config(&config),
            store,
            config,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Starts a session, or returns the caller's current one.
    ///
    /// If `presented` names an active session it is returned unchanged with
    /// `created = false`. Otherwise a new token is generated and stored,
    /// regenerating on collision up to `max_insert_attempts` times.
    pub async fn start_session(&self, presented: Option<&str>) -> Result<IssuedSession, AppError> {
        if let Some(token) = presented.and_then(SessionToken::parse) {
            if let Some(existing) = self.store.find_active(&token).await? {
                debug!(token_fp = %token.fingerprint(), "Reusing active session");
                return Ok(IssuedSession::reused(existing));
            }
            debug!(token_fp = %token.fingerprint(), "Presented token is not active");
        }

        let session = self.create_session().await.inspect_err(|e| {
            if e.is_fatal() {
                error!(error = %e, "Session issuing is unavailable");
            }
        })?;

        info!(
            session_id = session.id,
            token_fp = %session.token.fingerprint(),
            expires_at = %session.expires_at,
            "Session created"
        );

        Ok(IssuedSession::created(session))
    }

    /// Reports whether `token` maps to an active session.
    ///
    /// Unknown, expired and malformed tokens are all `NotActive`. Only
    /// storage failures are errors. Validation never extends the expiry.
    pub async fn validate_session(&self, token: &str) -> Result<SessionStatus, AppError> {
        let Some(token) = SessionToken::parse(token) else {
            return Ok(SessionStatus::NotActive);
        };

        let found = self.store.find_active(&token).await?;
        if found.is_none() {
            debug!(token_fp = %token.fingerprint(), "Session not active");
        }
        Ok(SessionStatus::from(found))
    }

    /// Resets an active session's expiry to a full TTL from now.
    ///
    /// Expired sessions stay expired and report `NotActive`.
    pub async fn renew_session(&self, token: &str) -> Result<SessionStatus, AppError> {
        let Some(token) = SessionToken::parse(token) else {
            return Ok(SessionStatus::NotActive);
        };

        let renewed = self.store.refresh(&token, self.config.ttl()).await?;
        match &renewed {
            Some(session) => info!(
                session_id = session.id,
                token_fp = %token.fingerprint(),
                expires_at = %session.expires_at,
                "Session renewed"
            ),
            None => debug!(token_fp = %token.fingerprint(), "Renewal skipped, session not active"),
        }
        Ok(SessionStatus::from(renewed))
    }

    /// Ends the session for `token`. Ending an unknown session succeeds.
    pub async fn end_session(&self, token: &str) -> Result<(), AppError> {
        let Some(token) = SessionToken::parse(token) else {
            return Ok(());
        };

        self.store.delete(&token).await?;
        info!(token_fp = %token.fingerprint(), "Session ended");
        Ok(())
    }

    /// Generates and stores a fresh token, retrying on collision.
    async fn create_session(&self) -> Result<Session, AppError> {
        let attempts = self.config.max_insert_attempts.max(1);
        let ttl = self.config.ttl();

        for attempt in 1..=attempts {
            let token = self.generator.generate()?;
            match self.store.insert(&token, ttl).await {
                Ok(session) => return Ok(session),
                Err(e) if e.is_duplicate_token() => {
                    warn!(
                        attempt,
                        max_attempts = attempts,
                        token_fp = %token.fingerprint(),
                        "Generated token collided with an active session, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        error!(attempts, "Failed to generate a unique session token");
        Err(AppError::exhausted_retries(format!(
            "No unique session token after {attempts} attempts"
        )))
    }
}
