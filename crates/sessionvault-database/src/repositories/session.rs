//! Session repository implementation.
//!
//! Pure SQL over the `sessions` table. Every method takes the current
//! instant from the caller (the session store and its clock), so no
//! query ever consults SQLite's own `now`.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use sessionvault_core::error::{AppError, ErrorKind};
use sessionvault_core::result::AppResult;
use sessionvault_entity::session::{Session, SessionToken};

const COLUMNS: &str = "id, token, owner, created_at, updated_at, expires_at";

/// Raw `sessions` row. Timestamps are Unix milliseconds.
#[derive(FromRow)]
struct SessionRow {
    id: i64,
    token: String,
    owner: Option<String>,
    created_at: i64,
    updated_at: i64,
    expires_at: i64,
}

impl SessionRow {
    fn into_session(self) -> AppResult<Session> {
        Ok(Session {
            id: self.id,
            token: SessionToken::new(self.token),
            owner: self.owner,
            created_at: from_millis(self.created_at)?,
            updated_at: from_millis(self.updated_at)?,
            expires_at: from_millis(self.expires_at)?,
        })
    }
}

/// Repository for session CRUD and query operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new session.
    ///
    /// Runs in one transaction: an *expired* record holding the same token
    /// is deleted first, then the insert relies on the unique index. A
    /// violation therefore means an active session owns the token, and is
    /// reported as [`ErrorKind::DuplicateToken`].
    pub async fn insert(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session> {
        let mut tx = self.pool.begin().await.map_err(storage_error("insert"))?;

        sqlx::query("DELETE FROM sessions WHERE token = ?1 AND expires_at <= ?2")
            .bind(token.expose())
            .bind(now.timestamp_millis())
            .execute(&mut *tx)
            .await
            .map_err(storage_error("insert"))?;

        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "INSERT INTO sessions (token, owner, created_at, updated_at, expires_at) \
             VALUES (?1, NULL, ?2, ?2, ?3) RETURNING {COLUMNS}"
        ))
        .bind(token.expose())
        .bind(now.timestamp_millis())
        .bind(expires_at.timestamp_millis())
        .fetch_one(&mut *tx)
        .await
        .map_err(insert_error)?;

        tx.commit().await.map_err(storage_error("insert"))?;

        row.into_session()
    }

    /// Find the session for `token` if it has not expired at `now`.
    pub async fn find_active(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {COLUMNS} FROM sessions WHERE token = ?1 AND expires_at > ?2"
        ))
        .bind(token.expose())
        .bind(now.timestamp_millis())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("find_active"))?
        .map(SessionRow::into_session)
        .transpose()
    }

    /// Push the expiry of an active session to `expires_at`.
    ///
    /// A single conditional update, so a session that expires between a
    /// lookup and this call is never revived.
    pub async fn refresh(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, SessionRow>(&format!(
            "UPDATE sessions SET updated_at = ?2, expires_at = ?3 \
             WHERE token = ?1 AND expires_at > ?2 RETURNING {COLUMNS}"
        ))
        .bind(token.expose())
        .bind(now.timestamp_millis())
        .bind(expires_at.timestamp_millis())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("refresh"))?
        .map(SessionRow::into_session)
        .transpose()
    }

    /// Delete any session holding `token`, expired or not.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(&self, token: &SessionToken) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?1")
            .bind(token.expose())
            .execute(&self.pool)
            .await
            .map_err(storage_error("delete"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete sessions that expired at or before `cutoff`.
    pub async fn purge_expired(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(cutoff.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(storage_error("purge_expired"))?;
        Ok(result.rows_affected())
    }

    /// Count sessions still active at `now`.
    pub async fn count_active(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE expires_at > ?1")
            .bind(now.timestamp_millis())
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error("count_active"))?;
        Ok(count.max(0) as u64)
    }

    /// List sessions active at `now`, newest first.
    pub async fn list_active(&self, now: DateTime<Utc>, limit: u32) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {COLUMNS} FROM sessions WHERE expires_at > ?1 ORDER BY id DESC LIMIT ?2"
        ))
        .bind(now.timestamp_millis())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("list_active"))?
        .into_iter()
        .map(SessionRow::into_session)
        .collect()
    }
}

/// Map a sqlx failure to `StorageUnavailable`, naming only the operation.
fn storage_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        AppError::with_source(
            ErrorKind::StorageUnavailable,
            format!("Session {operation} failed"),
            e,
        )
    }
}

fn insert_error(e: sqlx::Error) -> AppError {
    let collided = e
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());

    if collided {
        AppError::with_source(
            ErrorKind::DuplicateToken,
            "Session token is held by an active session",
            e,
        )
    } else {
        storage_error("insert")(e)
    }
}

fn from_millis(millis: i64) -> AppResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::internal(format!("Stored timestamp {millis} is out of range")))
}
