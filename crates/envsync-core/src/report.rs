//! Batch reports

use serde::Serialize;

use crate::reconcile::{ReconcileAction, ReconcileReport};

/// Outcome for one entry of the target directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnvironmentOutcome {
    /// The declaration reached a terminal state
    Reconciled(ReconcileReport),
    /// The entry has no declaration document
    Skipped { reason: String },
    /// Validation or a remote call failed
    Failed { error: String },
}

/// Result for one entry, labelled by directory name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentResult {
    pub directory: String,
    #[serde(flatten)]
    pub outcome: EnvironmentOutcome,
}

impl EnvironmentResult {
    pub fn reconciled(directory: impl Into<String>, report: ReconcileReport) -> Self {
        Self {
            directory: directory.into(),
            outcome: EnvironmentOutcome::Reconciled(report),
        }
    }

    pub fn skipped(directory: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            outcome: EnvironmentOutcome::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn failed(directory: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            outcome: EnvironmentOutcome::Failed {
                error: error.into(),
            },
        }
    }

    /// Terminal action, if the entry was reconciled
    pub fn action(&self) -> Option<ReconcileAction> {
        match &self.outcome {
            EnvironmentOutcome::Reconciled(report) => Some(report.action),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, EnvironmentOutcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, EnvironmentOutcome::Skipped { .. })
    }
}

/// Report from a full sync of the target directory
///
/// Individual failures are recorded here and logged; they do not make the
/// batch itself fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub dry_run: bool,
    /// One result per directory entry, in directory order
    pub results: Vec<EnvironmentResult>,
}

impl BatchReport {
    pub fn new(results: Vec<EnvironmentResult>, dry_run: bool) -> Self {
        Self { dry_run, results }
    }

    fn count_action(&self, action: ReconcileAction) -> usize {
        self.results
            .iter()
            .filter(|r| r.action() == Some(action))
            .count()
    }

    pub fn created(&self) -> usize {
        self.count_action(ReconcileAction::Created)
    }

    pub fn revised(&self) -> usize {
        self.count_action(ReconcileAction::Revised)
    }

    pub fn unchanged(&self) -> usize {
        self.count_action(ReconcileAction::NoOp)
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.results.iter().filter(|r| r.is_skipped()).count()
    }

    /// Look a result up by directory name
    pub fn result(&self, directory: &str) -> Option<&EnvironmentResult> {
        self.results.iter().find(|r| r.directory == directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restriction::RestrictionOutcome;
    use serde_json::json;

    fn reconciled(name: &str, action: ReconcileAction) -> EnvironmentResult {
        EnvironmentResult::reconciled(
            name,
            ReconcileReport {
                name: name.into(),
                environment_id: Some(format!("{name}-id")),
                action,
                restriction: RestrictionOutcome::NotChecked,
                fingerprint: "abc".into(),
                dry_run: false,
            },
        )
    }

    #[test]
    fn counts_by_outcome() {
        let report = BatchReport::new(
            vec![
                reconciled("a", ReconcileAction::Created),
                EnvironmentResult::failed("b", "boom"),
                reconciled("c", ReconcileAction::NoOp),
                EnvironmentResult::skipped("d", "no declaration"),
                reconciled("e", ReconcileAction::Revised),
            ],
            false,
        );

        assert_eq!(report.created(), 1);
        assert_eq!(report.revised(), 1);
        assert_eq!(report.unchanged(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(report.result("b").is_some_and(|r| r.is_failed()));
    }

    #[test]
    fn serializes_with_status_tag() {
        let value = serde_json::to_value(EnvironmentResult::failed("b", "boom")).unwrap();
        assert_eq!(
            value,
            json!({"directory": "b", "status": "failed", "error": "boom"})
        );

        let value = serde_json::to_value(reconciled("a", ReconcileAction::NoOp)).unwrap();
        assert_eq!(value["status"], json!("reconciled"));
        assert_eq!(value["action"], json!("no_op"));
        assert_eq!(value["restriction"], json!({"kind": "not_checked"}));
    }
}
