//! [`InMemoryGateway`]: an in-process stand-in for the remote platform.
//!
//! The gateway keeps a list of environments with their revisions and records
//! every call made through [`EnvironmentGateway`], so tests can assert both on
//! the resulting remote state and on the exact calls issued.
//!
//! # Example
//!
//! ```rust
//! use envsync_test_utils::{InMemoryGateway, Operation};
//!
//! let gateway = InMemoryGateway::new()
//!     .with_environment("existing", &["old-fingerprint"])
//!     .failing(Operation::Create, Some("broken"));
//! assert!(gateway.id_of("existing").is_some());
//! ```

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use envsync_core::{
    EnvironmentGateway, EnvironmentPayload, EnvironmentState, EnvironmentSummary, GatewayError,
    GatewayResult, RevisionPayload, RevisionRef,
};

/// Kinds of gateway call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Get,
    CreateRevision,
    Restrict,
    Archive,
}

/// One recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    List,
    Create { name: String },
    Get { id: String },
    CreateRevision { id: String },
    Restrict { id: String, revision_id: String },
    Archive { id: String },
}

impl GatewayCall {
    pub fn operation(&self) -> Operation {
        match self {
            Self::List => Operation::List,
            Self::Create { .. } => Operation::Create,
            Self::Get { .. } => Operation::Get,
            Self::CreateRevision { .. } => Operation::CreateRevision,
            Self::Restrict { .. } => Operation::Restrict,
            Self::Archive { .. } => Operation::Archive,
        }
    }

    /// Whether the call changes remote state
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::List | Self::Get { .. })
    }
}

/// A revision held by the fake platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRevision {
    pub id: String,
    pub tags: Vec<String>,
}

/// An environment held by the fake platform
#[derive(Debug, Clone)]
pub struct RemoteRecord {
    pub id: String,
    pub name: String,
    pub revisions: Vec<RemoteRevision>,
    pub selected_revision: Option<String>,
    pub restricted_revision: Option<String>,
    pub archived: bool,
    /// Left out of listings, to simulate a platform that lags behind creates
    pub hidden: bool,
    /// Body of the create call, when created through the gateway
    pub created_with: Option<EnvironmentPayload>,
    /// Body of the most recent revision call
    pub last_revision: Option<RevisionPayload>,
}

impl RemoteRecord {
    fn active_tags(&self) -> Vec<String> {
        self.selected_revision
            .as_ref()
            .and_then(|selected| self.revisions.iter().find(|r| &r.id == selected))
            .map(|r| r.tags.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct State {
    records: Vec<RemoteRecord>,
    calls: Vec<GatewayCall>,
    next_id: u64,
    failures: Vec<(Operation, Option<String>)>,
    hide_created: bool,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn add_record(&mut self, name: &str, tags: Option<Vec<String>>) -> usize {
        let n = self.next_id();
        let mut record = RemoteRecord {
            id: format!("{n:024x}"),
            name: name.to_string(),
            revisions: Vec::new(),
            selected_revision: None,
            restricted_revision: None,
            archived: false,
            hidden: false,
            created_with: None,
            last_revision: None,
        };
        if let Some(tags) = tags {
            let revision_id = format!("rev-{}", self.next_id());
            record.revisions.push(RemoteRevision {
                id: revision_id.clone(),
                tags,
            });
            record.selected_revision = Some(revision_id);
        }
        self.records.push(record);
        self.records.len() - 1
    }

    fn check_failure(&self, operation: Operation, name: Option<&str>) -> GatewayResult<()> {
        let fails = self.failures.iter().any(|(op, target)| {
            *op == operation
                && match target {
                    None => true,
                    Some(target) => Some(target.as_str()) == name,
                }
        });
        if fails {
            return Err(GatewayError::Status {
                method: format!("{operation:?}"),
                url: format!("memory://environments/{}", name.unwrap_or("*")),
                status: 500,
                body: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn index_of(&self, id: &str) -> GatewayResult<usize> {
        self.records
            .iter()
            .position(|r| r.id == id && !r.archived)
            .ok_or_else(|| GatewayError::Status {
                method: "GET".to_string(),
                url: format!("memory://environments/{id}"),
                status: 404,
                body: "environment not found".to_string(),
            })
    }
}

/// In-memory [`EnvironmentGateway`] that records every call
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Add an environment whose selected revision carries `tags`
    pub fn with_environment(self, name: &str, tags: &[&str]) -> Self {
        let tags = tags.iter().map(|t| t.to_string()).collect();
        self.state().add_record(name, Some(tags));
        self
    }

    /// Add an environment without any revision
    pub fn with_unbuilt_environment(self, name: &str) -> Self {
        self.state().add_record(name, None);
        self
    }

    /// Add an environment already restricted to its selected revision
    pub fn with_restricted_environment(self, name: &str, tags: &[&str]) -> Self {
        let tags = tags.iter().map(|t| t.to_string()).collect();
        {
            let mut state = self.state();
            let index = state.add_record(name, Some(tags));
            let record = &mut state.records[index];
            record.restricted_revision = record.selected_revision.clone();
        }
        self
    }

    /// Make every `operation` call fail, or only calls concerning `name`
    pub fn failing(self, operation: Operation, name: Option<&str>) -> Self {
        self.state()
            .failures
            .push((operation, name.map(str::to_string)));
        self
    }

    /// Keep created environments out of listings
    pub fn hiding_created(self) -> Self {
        self.state().hide_created = true;
        self
    }

    /// All calls in the order they were made
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().calls.clone()
    }

    /// Calls that changed remote state
    pub fn mutating_calls(&self) -> Vec<GatewayCall> {
        self.calls().into_iter().filter(|c| c.is_mutating()).collect()
    }

    /// Number of calls of one kind
    pub fn count(&self, operation: Operation) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Forget recorded calls, keeping remote state
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// First non-archived record with the given name
    pub fn record(&self, name: &str) -> Option<RemoteRecord> {
        self.state()
            .records
            .iter()
            .find(|r| r.name == name && !r.archived)
            .cloned()
    }

    pub fn id_of(&self, name: &str) -> Option<String> {
        self.record(name).map(|r| r.id)
    }

    /// Every record, archived ones included
    pub fn records(&self) -> Vec<RemoteRecord> {
        self.state().records.clone()
    }
}

#[async_trait]
impl EnvironmentGateway for InMemoryGateway {
    async fn list_environments(&self) -> GatewayResult<Vec<EnvironmentSummary>> {
        let mut state = self.state();
        state.calls.push(GatewayCall::List);
        state.check_failure(Operation::List, None)?;

        Ok(state
            .records
            .iter()
            .filter(|r| !r.archived && !r.hidden)
            .map(|r| EnvironmentSummary {
                id: r.id.clone(),
                name: r.name.clone(),
            })
            .collect())
    }

    async fn create_environment(&self, payload: &EnvironmentPayload) -> GatewayResult<()> {
        let mut state = self.state();
        state.calls.push(GatewayCall::Create {
            name: payload.name.clone(),
        });
        state.check_failure(Operation::Create, Some(&payload.name))?;

        let hidden = state.hide_created;
        let index = state.add_record(&payload.name, Some(payload.revision.tags.clone()));
        let record = &mut state.records[index];
        record.hidden = hidden;
        record.created_with = Some(payload.clone());
        Ok(())
    }

    async fn get_environment(&self, id: &str) -> GatewayResult<EnvironmentState> {
        let mut state = self.state();
        state.calls.push(GatewayCall::Get { id: id.to_string() });
        let index = state.index_of(id)?;
        let name = state.records[index].name.clone();
        state.check_failure(Operation::Get, Some(&name))?;

        let record = &state.records[index];
        Ok(EnvironmentState {
            active_revision_tags: record.active_tags(),
            selected_revision: record
                .selected_revision
                .clone()
                .map(|id| RevisionRef { id }),
            restricted_revision: record.restricted_revision.clone(),
        })
    }

    async fn create_environment_revision(
        &self,
        id: &str,
        payload: &RevisionPayload,
    ) -> GatewayResult<()> {
        let mut state = self.state();
        state.calls.push(GatewayCall::CreateRevision { id: id.to_string() });
        let index = state.index_of(id)?;
        let name = state.records[index].name.clone();
        state.check_failure(Operation::CreateRevision, Some(&name))?;

        let revision_id = format!("rev-{}", state.next_id());
        let record = &mut state.records[index];
        record.revisions.push(RemoteRevision {
            id: revision_id.clone(),
            tags: payload.tags.clone(),
        });
        record.selected_revision = Some(revision_id);
        record.last_revision = Some(payload.clone());
        Ok(())
    }

    async fn restrict_environment_revision(
        &self,
        id: &str,
        revision_id: &str,
    ) -> GatewayResult<()> {
        let mut state = self.state();
        state.calls.push(GatewayCall::Restrict {
            id: id.to_string(),
            revision_id: revision_id.to_string(),
        });
        let index = state.index_of(id)?;
        let name = state.records[index].name.clone();
        state.check_failure(Operation::Restrict, Some(&name))?;

        state.records[index].restricted_revision = Some(revision_id.to_string());
        Ok(())
    }

    async fn archive_environment(&self, id: &str) -> GatewayResult<()> {
        let mut state = self.state();
        state.calls.push(GatewayCall::Archive { id: id.to_string() });
        let index = state.index_of(id)?;
        let name = state.records[index].name.clone();
        state.check_failure(Operation::Archive, Some(&name))?;

        state.records[index].archived = true;
        Ok(())
    }
}
