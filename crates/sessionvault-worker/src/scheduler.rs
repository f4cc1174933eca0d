//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use sessionvault_auth::SessionCleanup;
use sessionvault_core::error::AppError;

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler })
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Session reaper on a 6-field cron `schedule`.
    ///
    /// A tick that fires while the previous run is still going is skipped.
    /// Failures are logged and never leave the job.
    pub async fn register_session_reaper(
        &self,
        cleanup: Arc<SessionCleanup>,
        schedule: &str,
    ) -> Result<(), AppError> {
        let running = Arc::new(Mutex::new(()));
        validate_schedule(schedule)?;

        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let cleanup = Arc::clone(&cleanup);
            let running = Arc::clone(&running);
            Box::pin(async move {
                let Ok(_guard) = running.try_lock() else {
                    tracing::warn!("Previous session reaper run still active, skipping");
                    return;
                };
                tracing::debug!("Running session reaper");
                if let Err(e) = cleanup.run_cleanup().await {
                    tracing::error!("Session reaper failed: {}", e);
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to build session_reaper job: {}", e)))?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add session_reaper schedule: {}", e))
        })?;

        tracing::info!(schedule, "Registered: session_reaper");
        Ok(())
    }
}

/// Checks that `schedule` is a cron expression the scheduler accepts.
pub fn validate_schedule(schedule: &str) -> Result<(), AppError> {
    CronJob::new(schedule, |_uuid, _lock| {})
        .map(|_| ())
        .map_err(|e| {
            AppError::configuration(format!("Invalid cron schedule '{}': {}", schedule, e))
        })
}
