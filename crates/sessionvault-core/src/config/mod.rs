//! Application configuration schemas.
//!
//! All configuration structs are deserialized from an optional TOML file
//! via the `config` crate and overlaid with `SESSIONVAULT__`-prefixed
//! environment variables. Each sub-module represents a logical
//! configuration section; every field has a serde default.

pub mod database;
pub mod logging;
pub mod reaper;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::reaper::ReaperConfig;
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "SESSIONVAULT";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session issuing policy.
    #[serde(default)]
    pub session: SessionConfig,
    /// Expired-session reaper settings.
    #[serde(default)]
    pub reaper: ReaperConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional; a missing file yields the defaults overlaid
    /// with environment variables such as `SESSIONVAULT__SESSION__TTL_MINUTES`.
    /// The merged configuration is validated before it is returned.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        app.validate()?;
        Ok(app)
    }

    /// Parse configuration from a TOML string (no environment overlay).
    pub fn from_toml_str(source: &str) -> Result<Self, AppError> {
        let app: Self = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        app.validate()?;
        Ok(app)
    }

    /// Reject settings that would break session invariants.
    pub fn validate(&self) -> Result<(), AppError> {
        self.database.validate()?;
        self.session.validate()?;
        self.reaper.validate()?;
        Ok(())
    }
}
