//! SessionVault daemon
//!
//! Wires the session store to the database and keeps the expired-session
//! reaper running until shutdown.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use sessionvault_auth::{DatabaseSessionStore, SessionCleanup, SessionStore};
use sessionvault_core::config::AppConfig;
use sessionvault_core::error::AppError;
use sessionvault_database::DatabasePool;
use sessionvault_worker::CronScheduler;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Daemon error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("SESSIONVAULT_CONFIG").unwrap_or_else(|_| "config/default".to_string());

    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main daemon run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SessionVault v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + schema ─────────────────────
    let db_pool = DatabasePool::connect(&config.database).await?;
    db_pool.health_check().await?;

    let store: Arc<dyn SessionStore> = Arc::new(DatabaseSessionStore::from_config(
        db_pool.pool().clone(),
        &config.database,
    ));
    store.initialize().await?;

    let active = store.count_active().await?;
    tracing::info!(
        active,
        ttl_minutes = config.session.ttl_minutes,
        "Session store ready"
    );

    // ── Step 2: Reaper ───────────────────────────────────────────
    let mut scheduler = if config.reaper.enabled {
        let cleanup = Arc::new(SessionCleanup::from_config(
            Arc::clone(&store),
            &config.reaper,
        ));

        // One pass at startup so a long downtime does not leave a backlog.
        if let Err(e) = cleanup.run_cleanup().await {
            tracing::warn!("Initial session cleanup failed: {}", e);
        }

        let scheduler = CronScheduler::new().await?;
        scheduler
            .register_session_reaper(cleanup, &config.reaper.schedule)
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Session reaper disabled");
        None
    };

    // ── Step 3: Wait for shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping...");

    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!("Scheduler shutdown failed: {}", e);
        }
    }

    db_pool.close().await;

    tracing::info!("SessionVault shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
