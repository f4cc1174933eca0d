//! Expired-session reaper configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Longest accepted purge grace period (ten years).
pub const MAX_GRACE_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Periodic deletion of expired session records.
///
/// Purely maintenance: validity checks never depend on the reaper having run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaperConfig {
    /// Whether the daemon schedules the reaper at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression (seconds first).
    #[serde(default = "default_schedule")]
    pub schedule: String,
    /// Keep expired records this long past their expiry before deleting.
    #[serde(default)]
    pub grace_seconds: u64,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: default_schedule(),
            grace_seconds: 0,
        }
    }
}

impl ReaperConfig {
    /// Grace period as a [`chrono::Duration`], capped at [`MAX_GRACE_SECONDS`].
    pub fn grace(&self) -> Duration {
        Duration::seconds(self.grace_seconds.min(MAX_GRACE_SECONDS) as i64)
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if self.schedule.trim().is_empty() {
            return Err(AppError::configuration("reaper.schedule must not be empty"));
        }
        grace_period(self.grace_seconds).map(|_| ())
    }
}

/// Converts an operator-supplied grace period, rejecting values past
/// [`MAX_GRACE_SECONDS`].
pub fn grace_period(seconds: u64) -> Result<Duration, AppError> {
    if seconds > MAX_GRACE_SECONDS {
        return Err(AppError::configuration(format!(
            "Grace period must be at most {MAX_GRACE_SECONDS} seconds"
        )));
    }
    Ok(Duration::seconds(seconds as i64))
}

fn default_true() -> bool {
    true
}

fn default_schedule() -> String {
    "0 */15 * * * *".to_string()
}
