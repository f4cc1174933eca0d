//! Scheduled maintenance tasks for SessionVault.
//!
//! Currently a single job: the expired-session reaper, driven by a cron
//! expression. Foreground session operations never depend on it.

pub mod scheduler;

pub use scheduler::{CronScheduler, validate_schedule};
