//! SyncEngine implementation
//!
//! The SyncEngine walks the target directory and reconciles every declared
//! environment with the remote platform. Each environment is an independent
//! unit of work: its failure is logged and recorded, and the batch moves on.

use std::path::Path;
use std::sync::Arc;

use envsync_config::EnvironmentDeclaration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::discovery::{EnvironmentEntry, discover_environments};
use crate::gateway::{EnvironmentGateway, EnvironmentSummary, find_environment};
use crate::reconcile::Reconciler;
use crate::report::{BatchReport, EnvironmentResult};
use crate::{Error, Result};

/// Options for sync operations
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// If true, only read calls are made and results describe what would
    /// happen.
    pub dry_run: bool,
    /// Maximum number of environments reconciled at once. `1` processes them
    /// sequentially in directory order.
    pub concurrency: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            concurrency: 1,
        }
    }
}

/// Engine for synchronizing declarations with the remote platform
pub struct SyncEngine {
    gateway: Arc<dyn EnvironmentGateway>,
    options: SyncOptions,
}

impl SyncEngine {
    /// Create a new SyncEngine around an injected gateway
    pub fn new(gateway: Arc<dyn EnvironmentGateway>) -> Self {
        Self::with_options(gateway, SyncOptions::default())
    }

    pub fn with_options(gateway: Arc<dyn EnvironmentGateway>, options: SyncOptions) -> Self {
        Self { gateway, options }
    }

    fn reconciler(&self) -> Reconciler {
        Reconciler::new(Arc::clone(&self.gateway)).with_dry_run(self.options.dry_run)
    }

    /// Reconcile every environment under `target`.
    ///
    /// # Errors
    ///
    /// Only fatal conditions are returned as errors: a missing or empty target
    /// directory, or a reconciliation task that ended abnormally. Per-environment
    /// failures are part of the returned [`BatchReport`].
    pub async fn sync(&self, target: &Path) -> Result<BatchReport> {
        let entries = discover_environments(target)?;
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        tracing::info!(environments = ?names, "Building environments");

        let results = if self.options.concurrency <= 1 {
            self.sync_sequential(entries).await
        } else {
            self.sync_concurrent(entries).await?
        };

        Ok(BatchReport::new(results, self.options.dry_run))
    }

    async fn sync_sequential(&self, entries: Vec<EnvironmentEntry>) -> Vec<EnvironmentResult> {
        let reconciler = self.reconciler();
        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            results.push(process_environment(&reconciler, entry).await);
        }
        results
    }

    async fn sync_concurrent(
        &self,
        entries: Vec<EnvironmentEntry>,
    ) -> Result<Vec<EnvironmentResult>> {
        let permits = Arc::new(Semaphore::new(self.options.concurrency));
        let mut tasks = JoinSet::new();
        let count = entries.len();

        for (index, entry) in entries.into_iter().enumerate() {
            let permits = Arc::clone(&permits);
            let reconciler = self.reconciler();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                (index, process_environment(&reconciler, entry).await)
            });
        }

        let mut indexed = Vec::with_capacity(count);
        while let Some(joined) = tasks.join_next().await {
            let result = joined.map_err(|e| Error::Task {
                message: e.to_string(),
            })?;
            indexed.push(result);
        }

        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, result)| result).collect())
    }

    /// Archive the remote environment named `name`.
    ///
    /// Returns the archived environment. In dry-run mode the environment is
    /// only looked up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EnvironmentNotFound`] if no environment has that name.
    pub async fn archive(&self, name: &str) -> Result<EnvironmentSummary> {
        let Some(existing) = find_environment(self.gateway.as_ref(), name).await? else {
            return Err(Error::EnvironmentNotFound {
                name: name.to_string(),
            });
        };

        if self.options.dry_run {
            tracing::info!(
                environment = name,
                id = %existing.id,
                "[dry-run] Would archive environment"
            );
        } else {
            self.gateway.archive_environment(&existing.id).await?;
            tracing::info!(environment = name, id = %existing.id, "Archived environment");
        }

        Ok(existing)
    }
}

/// Reconcile one directory entry, turning every failure into a recorded result
async fn process_environment(
    reconciler: &Reconciler,
    entry: EnvironmentEntry,
) -> EnvironmentResult {
    if !entry.has_declaration() {
        tracing::warn!(environment = %entry.name, "No configuration file found, skipping");
        return EnvironmentResult::skipped(
            entry.name,
            format!("no {} found", envsync_config::DECLARATION_FILE),
        );
    }

    let declaration = match EnvironmentDeclaration::load(&entry.declaration_path()) {
        Ok(declaration) => declaration,
        Err(e) => {
            tracing::error!(
                environment = %entry.name,
                error = %e,
                "Failed to process environment"
            );
            return EnvironmentResult::failed(entry.name, e.to_string());
        }
    };

    match reconciler.reconcile(&declaration).await {
        Ok(report) => {
            tracing::info!(environment = %entry.name, "{}", report.describe());
            EnvironmentResult::reconciled(entry.name, report)
        }
        Err(e) => {
            tracing::error!(
                environment = %entry.name,
                error = %e,
                "Failed to process environment"
            );
            EnvironmentResult::failed(entry.name, e.to_string())
        }
    }
}
