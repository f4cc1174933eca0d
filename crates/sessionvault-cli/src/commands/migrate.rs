//! Database schema management command.

use crate::output;
use sessionvault_auth::SessionStore;
use sessionvault_core::error::AppError;

/// Execute the migrate command
pub async fn execute(config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config).await?;

    println!("Initializing session schema...");
    store.initialize().await?;
    output::print_success("Session schema is up to date.");

    Ok(())
}
