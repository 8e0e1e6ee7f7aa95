//! Chess Oracle - Unified CLI
//!
//! Terminal front ends for a chess match against a chat-completion model.

#![warn(missing_docs)]

mod cli;
mod console;
mod tui;

use anyhow::Result;
use chess_oracle::{Credential, CredentialStore, FileCredentialStore, OracleConfig};
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Tui { log_file } => {
            initialize_file_tracing(&log_file)?;
            let config = OracleConfig::load_or_default(&cli.config)?;
            let store = open_credentials(&config).await;
            tui::run_tui(config, store).await
        }
        Command::Console => {
            initialize_stderr_tracing();
            let config = OracleConfig::load_or_default(&cli.config)?;
            let store = open_credentials(&config).await;
            console::run_console(config, store).await
        }
        Command::SetKey { value } => {
            initialize_stderr_tracing();
            let config = OracleConfig::load_or_default(&cli.config)?;
            let store = FileCredentialStore::new(config.credentials_path());
            store
                .set(config.credential_key(), Credential::new(value.trim()))
                .await;
            println!("Credential stored in {}", store.path().display());
            Ok(())
        }
    }
}

/// Opens the file-backed store and seeds it from the environment when a key
/// is exported there.
#[instrument(skip(config), fields(path = %config.credentials_path().display()))]
async fn open_credentials(config: &OracleConfig) -> Arc<dyn CredentialStore> {
    let store = FileCredentialStore::new(config.credentials_path());

    if let Some(key) = config.api_key_from_env() {
        info!(var = %config.api_key_env(), "Seeding credential store from environment");
        store
            .set(config.credential_key(), Credential::new(key))
            .await;
    }

    Arc::new(store)
}

#[instrument]
fn initialize_stderr_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,chess_oracle=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Tracing initialized");
}

/// Logs to a file so the terminal UI is not overwritten.
#[instrument(skip(path), fields(path = %path.display()))]
fn initialize_file_tracing(path: &std::path::Path) -> Result<()> {
    let log_file = std::fs::File::create(path)?;
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chess_oracle=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    info!("Tracing initialized");
    Ok(())
}
