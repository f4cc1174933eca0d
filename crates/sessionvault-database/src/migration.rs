//! Database migration runner.

use sqlx::SqlitePool;
use tracing::info;

use sessionvault_core::error::{AppError, ErrorKind};

/// Run all pending database migrations.
///
/// Idempotent: applied migrations are recorded by sqlx and skipped.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    info!("Running database migrations...");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageUnavailable,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}
