//! Per-environment reconciliation
//!
//! For one declaration the reconciler walks the state machine
//! `Unknown -> {Absent, Present}`, `Present -> {Unchanged, Changed}` and ends in
//! `Created`, `NoOp` or `Revised`. Any error ends the walk; the caller records
//! it as a failure of this environment only.

use std::sync::Arc;

use envsync_config::EnvironmentDeclaration;
use serde::Serialize;

use crate::gateway::{EnvironmentGateway, GatewayError, find_environment};
use crate::payload::{EnvironmentPayload, RevisionPayload};
use crate::restriction::{RestrictionOutcome, enforce_restriction};
use crate::Result;

/// Remote state observed for a declaration before any change is made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteState {
    /// No environment with the declared name exists
    Absent,
    /// An environment with the declared name exists
    Present { id: String },
}

/// Terminal action of a reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileAction {
    /// The environment was created
    Created,
    /// A new revision was submitted
    Revised,
    /// The fingerprint is already on an active revision
    NoOp,
}

/// Outcome of reconciling one declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Declared environment name
    pub name: String,
    /// Remote id, unknown only for a dry-run creation
    pub environment_id: Option<String>,
    pub action: ReconcileAction,
    pub restriction: RestrictionOutcome,
    /// Content fingerprint of the declaration
    pub fingerprint: String,
    /// If true, no mutating call was made and `action` is what would happen
    pub dry_run: bool,
}

impl ReconcileReport {
    /// Human-readable summary in the form used by the CLI
    pub fn describe(&self) -> String {
        let verb = match (self.action, self.dry_run) {
            (ReconcileAction::Created, false) => "Created environment",
            (ReconcileAction::Created, true) => "[dry-run] Would create environment",
            (ReconcileAction::Revised, false) => "Created new revision for",
            (ReconcileAction::Revised, true) => "[dry-run] Would create new revision for",
            (ReconcileAction::NoOp, _) => "No changes for",
        };

        let mut line = format!("{} {}", verb, self.name);
        if let RestrictionOutcome::Restricted { revision_id } = &self.restriction {
            line.push_str(&format!(" (restricted revision {revision_id})"));
        }
        line
    }
}

/// Drives one declaration to its terminal state through the gateway
#[derive(Clone)]
pub struct Reconciler {
    gateway: Arc<dyn EnvironmentGateway>,
    dry_run: bool,
}

impl Reconciler {
    pub fn new(gateway: Arc<dyn EnvironmentGateway>) -> Self {
        Self {
            gateway,
            dry_run: false,
        }
    }

    /// When set, only read calls are made and the report describes the
    /// action that would have been taken.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Look up the remote state for a declared name
    pub async fn observe(&self, name: &str) -> Result<RemoteState> {
        Ok(match find_environment(self.gateway.as_ref(), name).await? {
            Some(existing) => RemoteState::Present { id: existing.id },
            None => RemoteState::Absent,
        })
    }

    /// Reconcile one declaration.
    ///
    /// # Errors
    ///
    /// Returns the first gateway error encountered; no further calls are made
    /// for this declaration after an error.
    pub async fn reconcile(&self, decl: &EnvironmentDeclaration) -> Result<ReconcileReport> {
        match self.observe(&decl.name).await? {
            RemoteState::Absent => {
                tracing::info!(environment = %decl.name, "Environment doesn't already exist");
                self.create(decl).await
            }
            RemoteState::Present { id } => {
                tracing::info!(environment = %decl.name, id = %id, "Environment already exists");
                self.revise(decl, id).await
            }
        }
    }

    async fn create(&self, decl: &EnvironmentDeclaration) -> Result<ReconcileReport> {
        if self.dry_run {
            return Ok(self.report(
                decl,
                None,
                ReconcileAction::Created,
                RestrictionOutcome::NotChecked,
            ));
        }

        self.gateway
            .create_environment(&EnvironmentPayload::from(decl))
            .await?;

        let Some(created) = find_environment(self.gateway.as_ref(), &decl.name).await? else {
            return Err(GatewayError::MissingAfterCreate {
                name: decl.name.clone(),
            }
            .into());
        };
        tracing::info!(environment = %decl.name, id = %created.id, "Created environment");

        let restriction =
            enforce_restriction(self.gateway.as_ref(), &created.id, decl.is_restricted).await?;

        Ok(self.report(
            decl,
            Some(created.id),
            ReconcileAction::Created,
            restriction,
        ))
    }

    async fn revise(&self, decl: &EnvironmentDeclaration, id: String) -> Result<ReconcileReport> {
        let state = self.gateway.get_environment(&id).await?;

        if state.has_tag(&decl.fingerprint) {
            tracing::info!(environment = %decl.name, "File has not changed since last run");
            return Ok(self.report(
                decl,
                Some(id),
                ReconcileAction::NoOp,
                RestrictionOutcome::NotChecked,
            ));
        }

        if self.dry_run {
            return Ok(self.report(
                decl,
                Some(id),
                ReconcileAction::Revised,
                RestrictionOutcome::NotChecked,
            ));
        }

        self.gateway
            .create_environment_revision(&id, &RevisionPayload::from(decl))
            .await?;
        tracing::info!(environment = %decl.name, id = %id, "Created new environment revision");

        let restriction =
            enforce_restriction(self.gateway.as_ref(), &id, decl.is_restricted).await?;

        Ok(self.report(decl, Some(id), ReconcileAction::Revised, restriction))
    }

    fn report(
        &self,
        decl: &EnvironmentDeclaration,
        environment_id: Option<String>,
        action: ReconcileAction,
        restriction: RestrictionOutcome,
    ) -> ReconcileReport {
        ReconcileReport {
            name: decl.name.clone(),
            environment_id,
            action,
            restriction,
            fingerprint: decl.fingerprint.clone(),
            dry_run: self.dry_run,
        }
    }
}
