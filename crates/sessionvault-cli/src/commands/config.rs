//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use sessionvault_core::config::AppConfig;
use sessionvault_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (file plus environment)
    Show,
    /// Validate the configuration
    Validate,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => match load_and_check(config_path) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{}' is valid", config_path));
                output::print_kv("Database", &config.database.url);
                output::print_kv(
                    "Session TTL",
                    &format!("{} minutes", config.session.ttl_minutes),
                );
                output::print_kv(
                    "Token entropy",
                    &format!("{} bits", config.session.token_bytes * 8),
                );
                output::print_kv(
                    "Reaper",
                    &if config.reaper.enabled {
                        config.reaper.schedule.clone()
                    } else {
                        "disabled".to_string()
                    },
                );
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {}", e));
                return Err(e);
            }
        },
    }

    Ok(())
}

/// Load the configuration and check what only the daemon would otherwise
/// reject at startup.
fn load_and_check(config_path: &str) -> Result<AppConfig, AppError> {
    let config = super::load_config(config_path)?;
    if config.reaper.enabled {
        sessionvault_worker::validate_schedule(&config.reaper.schedule)?;
    }
    Ok(config)
}
