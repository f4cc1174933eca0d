//! SQLite connection pool management.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use sessionvault_core::config::DatabaseConfig;
use sessionvault_core::error::{AppError, ErrorKind};

/// Wrapper around the sqlx SQLite connection pool.
///
/// Constructed once at startup and shared; nothing in SessionVault opens
/// ad hoc connections.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    /// The underlying sqlx connection pool.
    pool: SqlitePool,
}

impl DatabasePool {
    /// Create a new database pool from configuration.
    ///
    /// File-backed databases are created if missing and use WAL journaling.
    /// In-memory databases are pinned to a single connection that is never
    /// reaped, otherwise the data would vanish with the connection.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let in_memory = config.is_in_memory();

        info!(
            url = %config.url,
            in_memory,
            max_connections = config.max_connections,
            "Connecting to SQLite"
        );

        let mut options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Invalid database URL: {e}"),
                    e,
                )
            })?
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        let mut pool_options = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds));

        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            options = options
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal);

            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }

            pool_options = pool_options
                .max_connections(config.max_connections)
                .min_connections(config.min_connections.min(config.max_connections))
                .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));
        }

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageUnavailable,
                format!("Failed to connect to database: {e}"),
                e,
            )
        })?;

        info!("Successfully connected to SQLite");
        Ok(Self { pool })
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Return the underlying sqlx pool (consuming self).
    pub fn into_pool(self) -> SqlitePool {
        self.pool
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| {
                AppError::with_source(ErrorKind::StorageUnavailable, "Health check failed", e)
            })
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
