//! Remote State Gateway contract
//!
//! The reconciliation engine performs every remote read and mutation through
//! [`EnvironmentGateway`]. The engine receives the gateway as an injected
//! `Arc<dyn EnvironmentGateway>`, so tests can substitute an in-memory double.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::payload::{EnvironmentPayload, RevisionPayload};

/// Result type for gateway calls
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Errors raised by remote calls
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a response
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The platform answered with a non-success status
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// The response body did not have the expected shape
    #[error("Unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    /// A create call succeeded but the environment is not listed afterwards
    #[error("Environment '{name}' was created but is not listed by the platform")]
    MissingAfterCreate { name: String },
}

/// One entry of the environment listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSummary {
    pub id: String,
    pub name: String,
}

/// Reference to a revision of a remote environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRef {
    pub id: String,
}

/// Revision state of a remote environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentState {
    /// Tags carried by the environment's active revisions
    pub active_revision_tags: Vec<String>,
    /// Currently selected revision, if any
    pub selected_revision: Option<RevisionRef>,
    /// Restricted revision id; once set it is never changed by this system
    pub restricted_revision: Option<String>,
}

impl EnvironmentState {
    /// Whether any active revision is tagged with `fingerprint`
    pub fn has_tag(&self, fingerprint: &str) -> bool {
        self.active_revision_tags.iter().any(|tag| tag == fingerprint)
    }
}

/// Remote operations the reconciliation engine depends on
#[async_trait]
pub trait EnvironmentGateway: Send + Sync {
    /// List every environment visible to the caller
    async fn list_environments(&self) -> GatewayResult<Vec<EnvironmentSummary>>;

    /// Create a new environment. The assigned id is recovered by listing.
    async fn create_environment(&self, payload: &EnvironmentPayload) -> GatewayResult<()>;

    /// Fetch the revision state of one environment
    async fn get_environment(&self, id: &str) -> GatewayResult<EnvironmentState>;

    /// Submit a new revision for an existing environment
    async fn create_environment_revision(
        &self,
        id: &str,
        payload: &RevisionPayload,
    ) -> GatewayResult<()>;

    /// Lock an environment to one of its revisions
    async fn restrict_environment_revision(&self, id: &str, revision_id: &str)
    -> GatewayResult<()>;

    /// Archive an environment
    async fn archive_environment(&self, id: &str) -> GatewayResult<()>;
}

/// Look an environment up by name.
///
/// When several environments share the name, the first one in listing order
/// is returned. Names are assumed unique on the platform side.
pub async fn find_environment(
    gateway: &dyn EnvironmentGateway,
    name: &str,
) -> GatewayResult<Option<EnvironmentSummary>> {
    let environments = gateway.list_environments().await?;
    Ok(environments.into_iter().find(|env| env.name == name))
}
