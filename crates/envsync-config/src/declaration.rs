//! Validated environment declarations
//!
//! [`EnvironmentDeclaration::load`] is the single parse-and-validate step: it
//! either returns a complete value or a [`ConfigError`] listing every problem
//! found in the document.

use serde::Serialize;
use serde_yaml::Value;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::document::{RawDeclaration, RawProxy, RawTool, value_kind};
use crate::fingerprint::{fingerprint_bytes, read_fingerprinted};
use crate::rules::{ClusterType, Visibility, resolve_clusters, resolve_visibility};
use crate::{ConfigError, Description, EnvironmentVariable, FieldIssue, Result};

/// File name of the declaration inside each environment directory
pub const DECLARATION_FILE: &str = "environment.yaml";

/// HTTP exposure of a workspace tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    pub port: u16,
    pub internal_path: Option<String>,
    pub require_subdomain: bool,
    pub rewrite: bool,
}

/// A pluggable tool exposed inside the environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceTool {
    pub name: String,
    pub title: String,
    pub icon_url: String,
    pub start_scripts: Vec<String>,
    pub supported_file_extensions: Vec<String>,
    pub proxy_config: Option<ProxyConfig>,
}

/// One environment declaration, fully validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentDeclaration {
    pub name: String,
    pub base_image: String,
    pub dockerfile_instructions: String,
    pub environment_variables: Vec<EnvironmentVariable>,
    pub pre_setup_script: String,
    pub post_setup_script: String,
    pub pre_run_script: String,
    pub post_run_script: String,
    pub skip_cache: bool,
    pub use_vpn: bool,
    pub summary: String,
    pub description: Description,
    /// Declared tags followed by the content fingerprint
    pub tags: Vec<String>,
    pub supported_clusters: Vec<ClusterType>,
    pub visibility: Visibility,
    pub organization_owner_id: Option<String>,
    pub is_restricted: bool,
    pub workspace_tools: Vec<WorkspaceTool>,
    pub fingerprint: String,
    /// Path the declaration was read from
    pub source: PathBuf,
}

impl EnvironmentDeclaration {
    /// Load and validate the declaration at `path`.
    ///
    /// The file is read once; the fingerprint and the parsed document come
    /// from the same bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] for malformed YAML or non UTF-8 content, and
    /// [`ConfigError::Invalid`] with every field issue when validation fails.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| ConfigError::io(path, e))?;
        let (bytes, fingerprint) =
            read_fingerprinted(file).map_err(|e| ConfigError::io(path, e))?;
        let content = String::from_utf8(bytes).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, fingerprint, path)
    }

    /// Validate an in-memory document, fingerprinting its bytes.
    pub fn from_yaml(content: &str, source: impl Into<PathBuf>) -> Result<Self> {
        let fingerprint = fingerprint_bytes(content.as_bytes());
        Self::parse(content, fingerprint, &source.into())
    }

    fn parse(content: &str, fingerprint: String, source: &Path) -> Result<Self> {
        let value: Value = if content.trim().is_empty() {
            Value::Null
        } else {
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
                path: source.to_path_buf(),
                message: e.to_string(),
            })?
        };

        let mut issues = Vec::new();

        let raw = match &value {
            Value::Null => RawDeclaration::default(),
            Value::Mapping(map) => RawDeclaration::from_mapping(map, &mut issues),
            other => {
                return Err(ConfigError::Parse {
                    path: source.to_path_buf(),
                    message: format!(
                        "expected a mapping at the top level, found {}",
                        value_kind(other)
                    ),
                });
            }
        };

        let name = raw.name.map(String::from).unwrap_or_default();
        if name.trim().is_empty() {
            issues.push(FieldIssue::new("name", "is required"));
        }

        let visibility = resolve_visibility(
            raw.visibility.as_deref(),
            raw.organization_owner_id.as_ref().map(|id| id.0.as_str()),
            &mut issues,
        );

        let cluster_entries: Vec<String> = raw
            .supported_clusters
            .unwrap_or_default()
            .into_iter()
            .map(String::from)
            .collect();
        let clusters = resolve_clusters(&cluster_entries);

        let workspace_tools = build_workspace_tools(raw.pluggable_workspace_tools, &mut issues);

        if !issues.is_empty() {
            // One issue per field, first reported wins
            let mut reported = HashSet::new();
            issues.retain(|issue| reported.insert(issue.field.clone()));
            return Err(ConfigError::Invalid {
                path: source.to_path_buf(),
                issues,
            });
        }

        let mut tags: Vec<String> = raw
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(String::from)
            .collect();
        tags.push(fingerprint.clone());

        Ok(Self {
            name,
            base_image: raw.image.unwrap_or_default(),
            dockerfile_instructions: raw.dockerfile_instructions.unwrap_or_default(),
            environment_variables: raw.environment_variables.unwrap_or_default(),
            pre_setup_script: raw.pre_setup_script.unwrap_or_default(),
            post_setup_script: raw.post_setup_script.unwrap_or_default(),
            pre_run_script: raw.pre_run_script.unwrap_or_default(),
            post_run_script: raw.post_run_script.unwrap_or_default(),
            skip_cache: raw.skip_cache.unwrap_or(false),
            use_vpn: raw.use_vpn.unwrap_or(false),
            summary: raw.summary.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            tags,
            supported_clusters: clusters.clusters,
            visibility: visibility.visibility,
            organization_owner_id: visibility.organization_owner_id,
            is_restricted: raw.is_restricted.unwrap_or(false),
            workspace_tools,
            fingerprint,
            source: source.to_path_buf(),
        })
    }
}

fn build_workspace_tools(
    tools: Option<serde_yaml::Mapping>,
    issues: &mut Vec<FieldIssue>,
) -> Vec<WorkspaceTool> {
    let Some(tools) = tools else {
        return Vec::new();
    };

    let mut built = Vec::with_capacity(tools.len());
    for (key, value) in tools {
        let name = match key {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            other => {
                issues.push(FieldIssue::new(
                    "pluggableWorkspaceTools",
                    format!("tool names must be scalars, found {}", value_kind(&other)),
                ));
                continue;
            }
        };
        let field = format!("pluggableWorkspaceTools.{name}");

        let raw: RawTool = if value.is_null() {
            RawTool::default()
        } else {
            match serde_yaml::from_value(value) {
                Ok(raw) => raw,
                Err(e) => {
                    issues.push(FieldIssue::new(field, e.to_string()));
                    continue;
                }
            }
        };

        if let Some(tool) = build_tool(name, &field, raw, issues) {
            built.push(tool);
        }
    }

    built
}

fn build_tool(
    name: String,
    field: &str,
    raw: RawTool,
    issues: &mut Vec<FieldIssue>,
) -> Option<WorkspaceTool> {
    let before = issues.len();

    let title = match raw.title {
        None => {
            issues.push(FieldIssue::new(format!("{field}.title"), "is required"));
            None
        }
        Some(title) => Some(title.filter(|t| !t.is_empty()).unwrap_or_else(|| name.clone())),
    };

    let icon_url = match raw.icon_url {
        None => {
            issues.push(FieldIssue::new(format!("{field}.iconUrl"), "is required"));
            None
        }
        Some(icon) => Some(icon.unwrap_or_default()),
    };

    let start_scripts = match raw.start {
        None => {
            issues.push(FieldIssue::new(format!("{field}.start"), "is required"));
            None
        }
        Some(None) => {
            issues.push(FieldIssue::new(format!("{field}.start"), "must not be empty"));
            None
        }
        Some(Some(scripts)) if scripts.is_empty() => {
            issues.push(FieldIssue::new(format!("{field}.start"), "must not be empty"));
            None
        }
        Some(Some(scripts)) => Some(scripts),
    };

    let proxy_config = raw
        .http_proxy
        .and_then(|proxy| build_proxy(&format!("{field}.httpProxy"), proxy, issues));

    if issues.len() > before {
        return None;
    }

    Some(WorkspaceTool {
        name,
        title: title.unwrap_or_default(),
        icon_url: icon_url.unwrap_or_default(),
        start_scripts: start_scripts.unwrap_or_default(),
        supported_file_extensions: raw.supported_file_extensions.unwrap_or_default(),
        proxy_config,
    })
}

fn build_proxy(field: &str, raw: RawProxy, issues: &mut Vec<FieldIssue>) -> Option<ProxyConfig> {
    let Some(port) = raw.port else {
        issues.push(FieldIssue::new(format!("{field}.port"), "is required"));
        return None;
    };

    Some(ProxyConfig {
        port,
        internal_path: raw.internal_path.filter(|p| !p.is_empty()),
        require_subdomain: raw.require_subdomain.unwrap_or(false),
        rewrite: raw.rewrite.unwrap_or(false),
    })
}
