//! CLI command definitions and dispatch.

pub mod config;
pub mod migrate;
pub mod session;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use sessionvault_auth::DatabaseSessionStore;
use sessionvault_core::config::AppConfig;
use sessionvault_core::error::AppError;
use sessionvault_database::DatabasePool;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "SESSIONVAULT_CONFIG";

/// Configuration file used when neither `--config` nor the environment names one.
const DEFAULT_CONFIG: &str = "config/default";

/// SessionVault — session token lifecycle administration
#[derive(Debug, Parser)]
#[command(name = "sessionvault", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (falls back to $SESSIONVAULT_CONFIG)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create or upgrade the session schema
    Migrate,
    /// Session management
    Session(session::SessionArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config_path = self.config_path();
        match &self.command {
            Commands::Migrate => migrate::execute(&config_path).await,
            Commands::Session(args) => session::execute(args, &config_path, self.format).await,
            Commands::Config(args) => config::execute(args, &config_path, self.format).await,
        }
    }

    /// `--config`, then `$SESSIONVAULT_CONFIG`, then the default path.
    fn config_path(&self) -> String {
        self.config
            .clone()
            .or_else(|| std::env::var(CONFIG_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG.to_string())
    }
}

/// Helper: load configuration from file and environment
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: connect to the configured database and build a session store
pub async fn open_store(config: &AppConfig) -> Result<Arc<DatabaseSessionStore>, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    Ok(Arc::new(DatabaseSessionStore::from_config(
        pool.into_pool(),
        &config.database,
    )))
}
