//! Archive command implementation

use std::sync::Arc;

use colored::Colorize;
use envsync_core::{EnvironmentGateway, SyncEngine, SyncOptions};

use crate::error::Result;

/// Archive the remote environment named `name`
pub async fn run_archive(
    gateway: Arc<dyn EnvironmentGateway>,
    name: &str,
    dry_run: bool,
) -> Result<()> {
    let engine = SyncEngine::with_options(
        gateway,
        SyncOptions {
            dry_run,
            ..Default::default()
        },
    );

    let archived = engine.archive(name).await?;

    if dry_run {
        println!(
            "{} Would archive {} ({})",
            "[dry-run]".yellow().bold(),
            archived.name.cyan(),
            archived.id.dimmed()
        );
    } else {
        println!(
            "{} Archived {} ({})",
            "OK".green().bold(),
            archived.name.cyan(),
            archived.id.dimmed()
        );
    }
    Ok(())
}
