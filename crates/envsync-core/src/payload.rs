//! Request bodies sent to the remote platform

use envsync_config::{
    ClusterType, Description, EnvironmentDeclaration, EnvironmentVariable, Visibility,
    WorkspaceTool,
};
use serde::Serialize;

/// Build definition shared by environment creation and new revisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionPayload {
    pub image: String,
    pub dockerfile_instructions: String,
    pub environment_variables: Vec<EnvironmentVariable>,
    pub pre_setup_script: String,
    pub post_setup_script: String,
    pub pre_run_script: String,
    pub post_run_script: String,
    pub skip_cache: bool,
    pub summary: String,
    pub supported_clusters: Vec<ClusterType>,
    pub tags: Vec<String>,
    pub use_vpn: bool,
    pub workspace_tools: Vec<WorkspaceTool>,
}

/// Body of an environment creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentPayload {
    pub name: String,
    pub visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_owner_id: Option<String>,
    pub is_restricted: bool,
    pub description: Description,
    pub add_base_dependencies: bool,
    #[serde(flatten)]
    pub revision: RevisionPayload,
}

impl From<&EnvironmentDeclaration> for RevisionPayload {
    fn from(decl: &EnvironmentDeclaration) -> Self {
        Self {
            image: decl.base_image.clone(),
            dockerfile_instructions: decl.dockerfile_instructions.clone(),
            environment_variables: decl.environment_variables.clone(),
            pre_setup_script: decl.pre_setup_script.clone(),
            post_setup_script: decl.post_setup_script.clone(),
            pre_run_script: decl.pre_run_script.clone(),
            post_run_script: decl.post_run_script.clone(),
            skip_cache: decl.skip_cache,
            summary: decl.summary.clone(),
            supported_clusters: decl.supported_clusters.clone(),
            tags: decl.tags.clone(),
            use_vpn: decl.use_vpn,
            workspace_tools: decl.workspace_tools.clone(),
        }
    }
}

impl From<&EnvironmentDeclaration> for EnvironmentPayload {
    fn from(decl: &EnvironmentDeclaration) -> Self {
        Self {
            name: decl.name.clone(),
            visibility: decl.visibility,
            org_owner_id: decl.organization_owner_id.clone(),
            is_restricted: decl.is_restricted,
            description: decl.description.clone(),
            add_base_dependencies: true,
            revision: RevisionPayload::from(decl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn environment_payload_is_flat_camel_case() {
        let decl = EnvironmentDeclaration::from_yaml(
            "name: demo\nimage: ubuntu:22.04\nsupportedClusters: [ray]\nisRestricted: true\n",
            "demo/environment.yaml",
        )
        .unwrap();

        let body = serde_json::to_value(EnvironmentPayload::from(&decl)).unwrap();

        assert_eq!(body["name"], json!("demo"));
        assert_eq!(body["visibility"], json!("Private"));
        assert_eq!(body["isRestricted"], json!(true));
        assert_eq!(body["addBaseDependencies"], json!(true));
        assert_eq!(body["image"], json!("ubuntu:22.04"));
        assert_eq!(body["supportedClusters"], json!(["Ray"]));
        assert_eq!(body["tags"], json!([decl.fingerprint]));
        assert!(body.get("orgOwnerId").is_none());
        assert!(body.get("revision").is_none());
    }

    #[test]
    fn workspace_tools_serialize_with_proxy() {
        let decl = EnvironmentDeclaration::from_yaml(
            r#"
name: tools
pluggableWorkspaceTools:
  jupyter:
    title: Jupyter
    iconUrl: /icon.svg
    start: [/start.sh]
    httpProxy:
      port: 8888
      rewrite: true
"#,
            "tools/environment.yaml",
        )
        .unwrap();

        let body = serde_json::to_value(RevisionPayload::from(&decl)).unwrap();
        assert_eq!(
            body["workspaceTools"],
            json!([{
                "name": "jupyter",
                "title": "Jupyter",
                "iconUrl": "/icon.svg",
                "startScripts": ["/start.sh"],
                "supportedFileExtensions": [],
                "proxyConfig": {
                    "port": 8888,
                    "internalPath": null,
                    "requireSubdomain": false,
                    "rewrite": true
                }
            }])
        );
    }
}
