//! Reconciling single declarations against the in-memory gateway

use std::sync::Arc;

use envsync_config::EnvironmentDeclaration;
use envsync_core::{
    Error, GatewayError, ReconcileAction, Reconciler, RemoteState, RestrictionOutcome,
    enforce_restriction,
};
use envsync_test_utils::{GatewayCall, InMemoryGateway, Operation};
use pretty_assertions::assert_eq;

fn declaration(yaml: &str) -> EnvironmentDeclaration {
    EnvironmentDeclaration::from_yaml(yaml, "environment_templates/demo/environment.yaml")
        .unwrap()
}

const PLAIN: &str = "name: demo\nimage: quay.io/example/base:latest\n";
const RESTRICTED: &str = "name: demo\nimage: quay.io/example/base:latest\nisRestricted: true\n";

#[tokio::test]
async fn test_fresh_environment_is_created_and_restricted() {
    let gateway = Arc::new(InMemoryGateway::new());
    let decl = declaration(RESTRICTED);

    let report = Reconciler::new(gateway.clone())
        .reconcile(&decl)
        .await
        .unwrap();

    let record = gateway.record("demo").unwrap();
    let selected = record.selected_revision.clone().unwrap();
    assert_eq!(report.action, ReconcileAction::Created);
    assert_eq!(report.environment_id.as_deref(), Some(record.id.as_str()));
    assert_eq!(
        report.restriction,
        RestrictionOutcome::Restricted {
            revision_id: selected.clone()
        }
    );
    assert_eq!(record.restricted_revision, Some(selected.clone()));
    assert_eq!(
        gateway.calls(),
        vec![
            GatewayCall::List,
            GatewayCall::Create {
                name: "demo".into()
            },
            GatewayCall::List,
            GatewayCall::Get {
                id: record.id.clone()
            },
            GatewayCall::Restrict {
                id: record.id.clone(),
                revision_id: selected
            },
        ]
    );
}

#[tokio::test]
async fn test_create_payload_carries_fingerprint_tag() {
    let gateway = Arc::new(InMemoryGateway::new());
    let decl = declaration("name: demo\ntags: [python]\n");

    Reconciler::new(gateway.clone())
        .reconcile(&decl)
        .await
        .unwrap();

    let payload = gateway.record("demo").unwrap().created_with.unwrap();
    assert_eq!(payload.revision.tags, vec!["python".to_string(), decl.fingerprint]);
    assert!(payload.add_base_dependencies);
}

#[tokio::test]
async fn test_unchanged_declaration_is_a_noop() {
    let decl = declaration(PLAIN);
    let gateway = Arc::new(
        InMemoryGateway::new().with_environment("demo", &[decl.fingerprint.as_str()]),
    );

    let report = Reconciler::new(gateway.clone())
        .reconcile(&decl)
        .await
        .unwrap();

    assert_eq!(report.action, ReconcileAction::NoOp);
    assert_eq!(report.restriction, RestrictionOutcome::NotChecked);
    assert!(gateway.mutating_calls().is_empty());
    assert_eq!(gateway.count(Operation::Get), 1);
}

#[tokio::test]
async fn test_changed_declaration_submits_one_revision() {
    let gateway = Arc::new(InMemoryGateway::new().with_environment("demo", &["stale"]));
    let decl = declaration(PLAIN);
    let id = gateway.id_of("demo").unwrap();

    let report = Reconciler::new(gateway.clone())
        .reconcile(&decl)
        .await
        .unwrap();

    assert_eq!(report.action, ReconcileAction::Revised);
    assert_eq!(report.restriction, RestrictionOutcome::NotRequested);
    assert_eq!(
        gateway.calls(),
        vec![
            GatewayCall::List,
            GatewayCall::Get { id: id.clone() },
            GatewayCall::CreateRevision { id: id.clone() },
            GatewayCall::Get { id },
        ]
    );

    let revision = gateway.record("demo").unwrap().last_revision.unwrap();
    assert_eq!(revision.tags.last(), Some(&decl.fingerprint));
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let gateway = Arc::new(InMemoryGateway::new());
    let decl = declaration(PLAIN);
    let reconciler = Reconciler::new(gateway.clone());

    let first = reconciler.reconcile(&decl).await.unwrap();
    gateway.clear_calls();
    let second = reconciler.reconcile(&decl).await.unwrap();

    assert_eq!(first.action, ReconcileAction::Created);
    assert_eq!(second.action, ReconcileAction::NoOp);
    assert!(gateway.mutating_calls().is_empty());
}

#[tokio::test]
async fn test_existing_restriction_is_never_moved() {
    let gateway =
        Arc::new(InMemoryGateway::new().with_restricted_environment("demo", &["stale"]));
    let locked = gateway.record("demo").unwrap().restricted_revision.unwrap();
    let decl = declaration(RESTRICTED);

    let report = Reconciler::new(gateway.clone())
        .reconcile(&decl)
        .await
        .unwrap();

    let record = gateway.record("demo").unwrap();
    assert_eq!(report.action, ReconcileAction::Revised);
    assert_eq!(
        report.restriction,
        RestrictionOutcome::AlreadyRestricted {
            revision_id: locked.clone()
        }
    );
    assert_ne!(record.selected_revision, Some(locked.clone()));
    assert_eq!(record.restricted_revision, Some(locked));
    assert_eq!(gateway.count(Operation::Restrict), 0);
}

#[tokio::test]
async fn test_restriction_without_selected_revision_is_skipped() {
    let gateway = InMemoryGateway::new().with_unbuilt_environment("demo");
    let id = gateway.id_of("demo").unwrap();

    let outcome = enforce_restriction(&gateway, &id, true).await.unwrap();

    assert_eq!(outcome, RestrictionOutcome::NoSelectedRevision);
    assert_eq!(gateway.count(Operation::Restrict), 0);
}

#[tokio::test]
async fn test_first_environment_with_duplicate_name_wins() {
    let gateway = Arc::new(
        InMemoryGateway::new()
            .with_environment("demo", &["first"])
            .with_environment("demo", &["second"]),
    );
    let first_id = gateway.records()[0].id.clone();

    let state = Reconciler::new(gateway.clone())
        .observe("demo")
        .await
        .unwrap();

    assert_eq!(state, RemoteState::Present { id: first_id });
}

#[tokio::test]
async fn test_dry_run_makes_no_mutating_calls() {
    let gateway = Arc::new(InMemoryGateway::new().with_environment("existing", &["stale"]));
    let reconciler = Reconciler::new(gateway.clone()).with_dry_run(true);

    let created = reconciler.reconcile(&declaration(RESTRICTED)).await.unwrap();
    let revised = reconciler
        .reconcile(&declaration("name: existing\n"))
        .await
        .unwrap();

    assert_eq!(created.action, ReconcileAction::Created);
    assert_eq!(created.environment_id, None);
    assert_eq!(created.describe(), "[dry-run] Would create environment demo");
    assert_eq!(revised.action, ReconcileAction::Revised);
    assert!(gateway.mutating_calls().is_empty());
    assert!(gateway.record("demo").is_none());
}

#[tokio::test]
async fn test_missing_environment_after_create_is_an_error() {
    let gateway = Arc::new(InMemoryGateway::new().hiding_created());

    let err = Reconciler::new(gateway.clone())
        .reconcile(&declaration(RESTRICTED))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Gateway(GatewayError::MissingAfterCreate { ref name }) if name == "demo"
    ));
    assert_eq!(gateway.count(Operation::Restrict), 0);
}

#[tokio::test]
async fn test_failed_revision_stops_the_walk() {
    let gateway = Arc::new(
        InMemoryGateway::new()
            .with_environment("demo", &["stale"])
            .failing(Operation::CreateRevision, Some("demo")),
    );

    let err = Reconciler::new(gateway.clone())
        .reconcile(&declaration(RESTRICTED))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Gateway(GatewayError::Status { status: 500, .. })
    ));
    assert_eq!(gateway.count(Operation::Get), 1);
    assert_eq!(gateway.count(Operation::Restrict), 0);
}
