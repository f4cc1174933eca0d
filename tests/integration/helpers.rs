//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};

use sessionvault_auth::{DatabaseSessionStore, SessionManager, SessionStore};
use sessionvault_core::config::{AppConfig, DatabaseConfig};
use sessionvault_core::traits::ManualClock;
use sessionvault_database::DatabasePool;

/// Fixed starting instant for clock-driven tests.
pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

/// Test application context
pub struct TestApp {
    /// Session manager under test
    pub manager: SessionManager,
    /// The store behind the manager
    pub store: Arc<DatabaseSessionStore>,
    /// Clock driving every expiry decision
    pub clock: ManualClock,
    /// Database pool for direct queries
    pub db_pool: DatabasePool,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a test application on a fresh in-memory database
    pub async fn new() -> Self {
        Self::with_database(DatabaseConfig::in_memory()).await
    }

    /// Create a test application on the given database
    pub async fn with_database(database: DatabaseConfig) -> Self {
        let config = AppConfig {
            database,
            ..AppConfig::default()
        };

        let db_pool = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");

        let clock = ManualClock::new(t0());
        let store = Arc::new(DatabaseSessionStore::new(
            db_pool.pool().clone(),
            Arc::new(clock.clone()),
            config.database.operation_timeout(),
        ));
        store.initialize().await.expect("Failed to initialize schema");

        let manager = SessionManager::new(store.clone(), config.session.clone());

        Self {
            manager,
            store,
            clock,
            db_pool,
            config,
        }
    }

    /// Count every stored row, expired or not
    pub async fn total_rows(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(self.db_pool.pool())
            .await
            .expect("Failed to count rows")
    }
}
