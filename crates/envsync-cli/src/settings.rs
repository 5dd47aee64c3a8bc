//! Startup settings resolved from flags and environment variables
//!
//! Every check here runs before any environment is touched. A failure is a
//! fatal startup error.

use std::fmt;
use std::path::{Path, PathBuf};

use envsync_client::{Credentials, normalize_host, proxy_base};
use url::Url;

use crate::cli::ConnectionArgs;
use crate::error::{CliError, Result};

/// Name of the directory holding environment folders
pub const TEMPLATES_DIR: &str = "environment_templates";

/// Project the run is attributed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Resolved connection to the remote platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub project: Project,
    pub base_url: Url,
    pub credentials: Credentials,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl Connection {
    /// Resolve project identity, endpoint and credentials.
    ///
    /// When an API proxy is configured it is used as the endpoint and
    /// authenticates requests itself; otherwise a host and either an API key
    /// or an auth token are required.
    pub fn resolve(args: &ConnectionArgs) -> Result<Self> {
        let (Some(owner), Some(name)) = (
            non_empty(&args.project_owner),
            non_empty(&args.project_name),
        ) else {
            return Err(CliError::startup(
                "Please provide DOMINO_PROJECT_OWNER and DOMINO_PROJECT_NAME \
                 (or --project-owner and --project-name)",
            ));
        };
        let project = Project {
            owner: owner.to_string(),
            name: name.to_string(),
        };

        if let Some(proxy) = non_empty(&args.api_proxy) {
            let base_url = proxy_base(proxy)?;
            tracing::info!(project = %project, proxy = %base_url, "Connecting through API proxy");
            return Ok(Self {
                project,
                base_url,
                credentials: Credentials::Proxy,
            });
        }

        let Some(host) = non_empty(&args.host) else {
            return Err(CliError::startup(
                "Please provide DOMINO_URL (or --host) with the URL of your platform instance",
            ));
        };
        let base_url = normalize_host(host)?;

        let Some(credentials) = Credentials::from_options(
            args.api_key.as_deref(),
            args.auth_token.as_deref(),
        ) else {
            return Err(CliError::startup(
                "Please provide DOMINO_API_KEY with your API key, \
                 or DOMINO_AUTH_TOKEN with a service account token",
            ));
        };

        tracing::info!(project = %project, host = %base_url, "Connecting to {}", base_url);
        Ok(Self {
            project,
            base_url,
            credentials,
        })
    }
}

/// Resolve the directory holding environment folders.
///
/// Without an explicit path, `environment_templates` is looked for in `cwd`
/// and then in its parent. An explicit path gets `environment_templates`
/// appended unless it already ends with it.
pub fn resolve_target_directory(explicit: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    let target = match explicit.filter(|p| !p.as_os_str().is_empty()) {
        Some(path) if path.ends_with(TEMPLATES_DIR) => path.to_path_buf(),
        Some(path) => path.join(TEMPLATES_DIR),
        None => {
            let candidates = [
                Some(cwd.join(TEMPLATES_DIR)),
                cwd.parent().map(|parent| parent.join(TEMPLATES_DIR)),
            ];
            match candidates.into_iter().flatten().find(|c| c.is_dir()) {
                Some(found) => found,
                None => {
                    return Err(CliError::startup(format!(
                        "Could not find '{TEMPLATES_DIR}' in current or parent directory. \
                         Set TARGET_DIRECTORY or create the folder."
                    )));
                }
            }
        }
    };

    if !target.is_dir() {
        return Err(CliError::startup(format!(
            "Target directory does not exist: {}",
            target.display()
        )));
    }

    tracing::info!(target = %target.display(), "Target directory");
    Ok(target)
}
