//! Restriction enforcement
//!
//! A remote environment is restricted at most once in its lifetime, and only
//! ever to the revision selected at the time the restriction is requested.

use serde::Serialize;

use crate::gateway::{EnvironmentGateway, GatewayResult};

/// What the restriction check did for one environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RestrictionOutcome {
    /// The check did not run (no change was made, or a dry run)
    NotChecked,
    /// The declaration does not ask for restriction
    NotRequested,
    /// A restriction already exists and is left as is
    AlreadyRestricted { revision_id: String },
    /// Restriction was requested but no revision is selected yet
    NoSelectedRevision,
    /// The selected revision was restricted by this run
    Restricted { revision_id: String },
}

/// Restrict the selected revision of `environment_id` if requested and not
/// already restricted.
///
/// # Errors
///
/// Returns the gateway error of the failing call.
pub async fn enforce_restriction(
    gateway: &dyn EnvironmentGateway,
    environment_id: &str,
    is_restricted: bool,
) -> GatewayResult<RestrictionOutcome> {
    let state = gateway.get_environment(environment_id).await?;

    if let Some(revision_id) = state.restricted_revision {
        tracing::debug!(
            environment_id,
            revision_id = %revision_id,
            "Environment already restricted"
        );
        return Ok(RestrictionOutcome::AlreadyRestricted { revision_id });
    }

    if !is_restricted {
        return Ok(RestrictionOutcome::NotRequested);
    }

    let Some(selected) = state.selected_revision else {
        tracing::warn!(environment_id, "Restriction requested but no revision is selected");
        return Ok(RestrictionOutcome::NoSelectedRevision);
    };

    tracing::debug!(
        environment_id,
        revision_id = %selected.id,
        "Restricting selected revision as environment is marked restricted"
    );
    gateway
        .restrict_environment_revision(environment_id, &selected.id)
        .await?;

    Ok(RestrictionOutcome::Restricted {
        revision_id: selected.id,
    })
}
