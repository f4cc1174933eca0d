//! Session store contract and its SQLite implementation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use sessionvault_core::config::DatabaseConfig;
use sessionvault_core::error::AppError;
use sessionvault_core::traits::{Clock, SystemClock};
use sessionvault_database::migration::run_migrations;
use sessionvault_database::repositories::session::SessionRepository;
use sessionvault_entity::session::{Session, SessionToken};

/// Durable CRUD over session records.
///
/// Validity is always judged against the store's own clock. Implementations
/// must be safe to call concurrently and must enforce token uniqueness
/// among active records themselves.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Ensures the backing schema exists. Safe to call on every startup.
    async fn initialize(&self) -> Result<(), AppError>;

    /// Creates a record expiring `ttl` from now.
    ///
    /// Fails with `DuplicateToken` if an active record already holds the
    /// token. A zero or negative `ttl` yields an already-expired record.
    async fn insert(&self, token: &SessionToken, ttl: Duration) -> Result<Session, AppError>;

    /// Returns the record for `token` only if it has not expired.
    async fn find_active(&self, token: &SessionToken) -> Result<Option<Session>, AppError>;

    /// Moves an active record's expiry to `ttl` from now.
    async fn refresh(
        &self,
        token: &SessionToken,
        ttl: Duration,
    ) -> Result<Option<Session>, AppError>;

    /// Removes any record holding `token`. Idempotent.
    async fn delete(&self, token: &SessionToken) -> Result<(), AppError>;

    /// Removes records that expired more than `grace` ago.
    async fn purge_expired(&self, grace: Duration) -> Result<u64, AppError>;

    /// Number of unexpired records.
    async fn count_active(&self) -> Result<u64, AppError>;

    /// Unexpired records, newest first.
    async fn list_active(&self, limit: u32) -> Result<Vec<Session>, AppError>;
}

/// SQLite-backed session store.
#[derive(Clone)]
pub struct DatabaseSessionStore {
    /// Session repository.
    repo: SessionRepository,
    /// Pool used for migrations.
    pool: SqlitePool,
    /// Source of "now" for every validity decision.
    clock: Arc<dyn Clock>,
    /// Upper bound on any single storage call.
    op_timeout: StdDuration,
}

impl std::fmt::Debug for DatabaseSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSessionStore")
            .field("op_timeout", &self.op_timeout)
            .finish()
    }
}

impl DatabaseSessionStore {
    /// Creates a store over `pool` using an explicit clock and timeout.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>, op_timeout: StdDuration) -> Self {
        Self {
            repo: SessionRepository::new(pool.clone()),
            pool,
            clock,
            op_timeout,
        }
    }

    /// Creates a store on the system clock with the configured timeout.
    pub fn from_config(pool: SqlitePool, config: &DatabaseConfig) -> Self {
        Self::new(pool, Arc::new(SystemClock), config.operation_timeout())
    }

    /// Runs `fut`, failing with `StorageUnavailable` if it outlives the
    /// operation timeout.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, AppError>> + Send,
    ) -> Result<T, AppError> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.op_timeout.as_millis() as u64,
                    "Session store operation timed out"
                );
                Err(AppError::storage_unavailable(format!(
                    "Session {operation} timed out"
                )))
            }
        }
    }
}

/// Expiry `ttl` after `now`, or a configuration error when it leaves the
/// representable range.
pub(crate) fn expiry_after(
    now: DateTime<Utc>,
    ttl: Duration,
) -> Result<DateTime<Utc>, AppError> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| AppError::configuration("Session TTL is out of range"))
}

/// Purge cutoff `grace` before `now`. A grace reaching past the earliest
/// representable instant keeps every record.
pub(crate) fn purge_cutoff(now: DateTime<Utc>, grace: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(grace).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[async_trait]
impl SessionStore for DatabaseSessionStore {
    async fn initialize(&self) -> Result<(), AppError> {
        self.bounded("initialize", run_migrations(&self.pool))
            .await?;
        info!("Session schema initialized");
        Ok(())
    }

    async fn insert(&self, token: &SessionToken, ttl: Duration) -> Result<Session, AppError> {
        let now = self.clock.now();
        let expires_at = expiry_after(now, ttl)?;
        self.bounded("insert", self.repo.insert(token, now, expires_at))
            .await
    }

    async fn find_active(&self, token: &SessionToken) -> Result<Option<Session>, AppError> {
        let now = self.clock.now();
        self.bounded("find_active", self.repo.find_active(token, now))
            .await
    }

    async fn refresh(
        &self,
        token: &SessionToken,
        ttl: Duration,
    ) -> Result<Option<Session>, AppError> {
        let now = self.clock.now();
        let expires_at = expiry_after(now, ttl)?;
        self.bounded("refresh", self.repo.refresh(token, now, expires_at))
            .await
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), AppError> {
        let removed = self.bounded("delete", self.repo.delete(token)).await?;
        debug!(token_fp = %token.fingerprint(), removed, "Session record deleted");
        Ok(())
    }

    async fn purge_expired(&self, grace: Duration) -> Result<u64, AppError> {
        let cutoff = purge_cutoff(self.clock.now(), grace);
        self.bounded("purge_expired", self.repo.purge_expired(cutoff))
            .await
    }

    async fn count_active(&self) -> Result<u64, AppError> {
        let now = self.clock.now();
        self.bounded("count_active", self.repo.count_active(now))
            .await
    }

    async fn list_active(&self, limit: u32) -> Result<Vec<Session>, AppError> {
        let now = self.clock.now();
        self.bounded("list_active", self.repo.list_active(now, limit))
            .await
    }
}
