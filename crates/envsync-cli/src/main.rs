//! envsync CLI
//!
//! Synchronizes the environment declarations under a templates directory
//! with the remote platform.

mod cli;
mod commands;
mod error;
mod logging;
mod settings;

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use envsync_client::HttpGateway;
use envsync_core::{EnvironmentGateway, SyncOptions};

use cli::{Cli, Commands};
use error::Result;
use settings::{Connection, resolve_target_directory};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level)?;

    let connection = Connection::resolve(&cli.connection)?;
    tracing::debug!(
        project = %connection.project,
        credentials = ?connection.credentials,
        "Resolved connection"
    );
    let gateway: Arc<dyn EnvironmentGateway> = Arc::new(HttpGateway::new(
        connection.base_url.clone(),
        connection.credentials.clone(),
    )?);

    match cli.command.unwrap_or_default() {
        Commands::Sync { dry_run, json } => {
            let cwd = std::env::current_dir()?;
            let target = resolve_target_directory(cli.target_directory.as_deref(), &cwd)?;
            let options = SyncOptions {
                dry_run,
                concurrency: usize::from(cli.concurrency),
            };
            commands::run_sync(gateway, &target, options, json).await?;
            Ok(())
        }
        Commands::Archive { name, dry_run } => {
            commands::run_archive(gateway, &name, dry_run).await
        }
    }
}
