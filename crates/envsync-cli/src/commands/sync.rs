//! Sync command implementation

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use envsync_core::{
    BatchReport, EnvironmentGateway, EnvironmentOutcome, ReconcileAction, SyncEngine, SyncOptions,
};

use crate::error::Result;

/// Run the sync command
///
/// Reconciles every environment under `target` and prints the batch report.
/// Per-environment failures are reported but do not fail the command.
pub async fn run_sync(
    gateway: Arc<dyn EnvironmentGateway>,
    target: &Path,
    options: SyncOptions,
    json: bool,
) -> Result<BatchReport> {
    if !json {
        let heading = if options.dry_run {
            "Previewing environment changes in"
        } else {
            "Synchronizing environments in"
        };
        println!("{} {} {}", "=>".blue().bold(), heading, target.display());
    }

    let engine = SyncEngine::with_options(gateway, options);
    let report = engine.sync(target).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(report)
}

fn print_report(report: &BatchReport) {
    for result in &report.results {
        match &result.outcome {
            EnvironmentOutcome::Reconciled(reconciled) => {
                let marker = match reconciled.action {
                    ReconcileAction::Created => "+".green(),
                    ReconcileAction::Revised => "~".yellow(),
                    ReconcileAction::NoOp => "=".dimmed(),
                };
                println!("   {} {}", marker, reconciled.describe());
            }
            EnvironmentOutcome::Skipped { reason } => {
                println!("   {} {} skipped: {}", "-".dimmed(), result.directory.cyan(), reason);
            }
            EnvironmentOutcome::Failed { error } => {
                println!("   {} {}: {}", "!".red(), result.directory.cyan(), error);
            }
        }
    }

    let status = if report.failed() == 0 {
        "OK".green().bold()
    } else {
        "DONE".yellow().bold()
    };
    println!("{} {}", status, summary_line(report));
}

/// One-line tally of the batch
pub fn summary_line(report: &BatchReport) -> String {
    let mut line = format!(
        "{} created, {} revised, {} unchanged, {} skipped, {} failed",
        report.created(),
        report.revised(),
        report.unchanged(),
        report.skipped(),
        report.failed()
    );
    if report.dry_run {
        line.push_str(" (dry run)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use envsync_core::EnvironmentResult;

    #[test]
    fn summary_counts_every_outcome() {
        let report = BatchReport::new(
            vec![
                EnvironmentResult::skipped("notes", "no environment.yaml found"),
                EnvironmentResult::failed("beta", "boom"),
            ],
            true,
        );

        assert_eq!(
            summary_line(&report),
            "0 created, 0 revised, 0 unchanged, 1 skipped, 1 failed (dry run)"
        );
    }
}
