//! Assetdesk CLI - command line client for the asset management API

mod commands;
mod config;
mod logging;

use anyhow::Result;
use assetdesk_client::{ApiClientBuilder, AuthSession, FileTokenStore, SessionEvent};
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{Level, debug, error, info};

#[derive(Parser)]
#[command(name = "assetdesk")]
#[command(about = "Command line client for the Assetdesk asset management API")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short = 'c', long, global = true, env = "ASSETDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Directory holding the stored access token
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.into())?;

    let mut client_config = config::load_client_config(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        client_config.base_url = base_url;
    }

    let state_dir = config::state_dir(cli.data_dir);
    let token_path = config::token_path(&client_config, &state_dir);
    debug!(path = %token_path.display(), "using token file");

    let session = AuthSession::new(Arc::new(FileTokenStore::new(token_path)));
    let mut events = session.subscribe();

    let client = ApiClientBuilder::from_config(&client_config)
        .session(session)
        .build()?;

    info!(base_url = client.base_url(), "Starting Assetdesk CLI");

    let result = cli.command.execute(&client).await;
    report_session_events(&mut events);

    if let Err(e) = result {
        error!("Command failed: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

/// Application shell side of the session: react to what happened during the command
fn report_session_events(events: &mut Receiver<SessionEvent>) {
    for event in pending_events(events) {
        match event {
            SessionEvent::Unauthenticated => {
                eprintln!("Your session has expired. Run `assetdesk login` to sign in again.");
            }
            SessionEvent::TokenRefreshed => debug!("access token was refreshed"),
            SessionEvent::LoggedIn | SessionEvent::LoggedOut => {}
        }
    }
}

/// Everything queued on `events`, skipping over any gap left by lagging
fn pending_events(events: &mut Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut pending = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => pending.push(event),
            Err(TryRecvError::Lagged(skipped)) => {
                debug!(skipped, "missed session events");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return pending,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
