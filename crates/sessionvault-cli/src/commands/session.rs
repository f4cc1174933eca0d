//! Session management CLI commands.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use sessionvault_auth::{SessionManager, SessionStore};
use sessionvault_core::config::reaper::grace_period;
use sessionvault_core::error::AppError;
use sessionvault_entity::session::{IssuedSession, Session, SessionStatus};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Start a session, or return the active one for --token
    Start {
        /// Token currently held by the client
        #[arg(long)]
        token: Option<String>,
    },
    /// Check whether a token maps to an active session
    Validate {
        /// Session token
        token: String,
    },
    /// Reset an active session's expiry to a full TTL
    Renew {
        /// Session token
        token: String,
    },
    /// End a session
    End {
        /// Session token
        token: String,
    },
    /// List active sessions
    List {
        /// Maximum number of sessions to show
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    /// Count active sessions
    Count,
    /// Delete expired sessions
    Purge {
        /// Keep sessions that expired less than this many seconds ago
        #[arg(long)]
        grace_seconds: Option<u64>,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Session display row
///
/// Shows a token fingerprint only; the token itself never leaves `start`.
#[derive(Debug, Serialize, Tabled)]
struct SessionRow {
    /// Session ID
    id: i64,
    /// Token fingerprint
    token_fp: String,
    /// Created
    created: String,
    /// Expires
    expires: String,
}

impl From<&Session> for SessionRow {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id,
            token_fp: s.token.fingerprint(),
            created: timestamp(s.created_at),
            expires: timestamp(s.expires_at),
        }
    }
}

/// Row printed by `start`
#[derive(Debug, Serialize, Tabled)]
struct IssuedRow {
    /// Token to hand to the client
    token: String,
    /// Expires
    expires: String,
    /// Newly created
    created: bool,
}

impl From<&IssuedSession> for IssuedRow {
    fn from(issued: &IssuedSession) -> Self {
        Self {
            token: issued.token.expose().to_string(),
            expires: timestamp(issued.expires_at),
            created: issued.created,
        }
    }
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config).await?;
    store.initialize().await?;
    let manager = SessionManager::new(store.clone(), config.session.clone());

    match &args.command {
        SessionCommand::Start { token } => {
            let issued = manager.start_session(token.as_deref()).await?;
            output::print_record(&IssuedRow::from(&issued), format);
        }
        SessionCommand::Validate { token } => {
            let status = manager.validate_session(token).await?;
            print_status(&status, format);
        }
        SessionCommand::Renew { token } => {
            let status = manager.renew_session(token).await?;
            print_status(&status, format);
        }
        SessionCommand::End { token } => {
            manager.end_session(token).await?;
            output::print_success("Session ended");
        }
        SessionCommand::List { limit } => {
            let sessions = store.list_active(*limit).await?;
            let rows: Vec<SessionRow> = sessions.iter().map(SessionRow::from).collect();
            output::print_list(&rows, format);
        }
        SessionCommand::Count => {
            let count = store.count_active().await?;
            match format {
                OutputFormat::Table => output::print_kv("Active sessions", &count.to_string()),
                OutputFormat::Json => println!("{}", serde_json::json!({ "active": count })),
            }
        }
        SessionCommand::Purge {
            grace_seconds,
            force,
        } => {
            let grace_seconds = grace_seconds.unwrap_or(config.reaper.grace_seconds);
            purge(store, grace_seconds, *force).await?;
        }
    }

    Ok(())
}

async fn purge(
    store: Arc<dyn SessionStore>,
    grace_seconds: u64,
    force: bool,
) -> Result<(), AppError> {
    let grace = grace_period(grace_seconds)?;

    if !force {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Delete sessions that expired more than {} seconds ago?",
                grace_seconds
            ))
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = store.purge_expired(grace).await?;

    output::print_success(&format!("Purged {} expired sessions", removed));
    Ok(())
}

fn print_status(status: &SessionStatus, format: OutputFormat) {
    match status {
        SessionStatus::Active(session) => output::print_record(&SessionRow::from(session), format),
        SessionStatus::NotActive => match format {
            OutputFormat::Table => output::print_warning("Session not active"),
            OutputFormat::Json => println!("{}", serde_json::json!({ "active": false })),
        },
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
