//! [`HttpGateway`]: the remote platform over its REST API

use async_trait::async_trait;
use envsync_core::{
    EnvironmentGateway, EnvironmentPayload, EnvironmentState, EnvironmentSummary, GatewayError,
    GatewayResult, RevisionPayload, RevisionRef,
};
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::Credentials;
use crate::error::Result;

const LIST_PATH: &str = "v4/environments/self";
const ENVIRONMENTS_PATH: &str = "api/environments/beta/environments";

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Vec<EnvironmentSummary>,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    environment: RemoteEnvironment,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteEnvironment {
    #[serde(default)]
    active_revision_tags: Option<Vec<String>>,
    #[serde(default)]
    selected_revision: Option<RevisionRef>,
    #[serde(default)]
    restricted_revision: Option<serde_json::Value>,
}

impl From<RemoteEnvironment> for EnvironmentState {
    fn from(remote: RemoteEnvironment) -> Self {
        Self {
            active_revision_tags: remote.active_revision_tags.unwrap_or_default(),
            selected_revision: remote.selected_revision,
            restricted_revision: remote.restricted_revision.and_then(revision_marker),
        }
    }
}

/// The platform reports the restricted revision either as an id or as a
/// revision object. Empty values mean no restriction.
fn revision_marker(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null | serde_json::Value::Bool(false) => None,
        serde_json::Value::String(id) if id.is_empty() => None,
        serde_json::Value::String(id) => Some(id),
        serde_json::Value::Object(map) => {
            let id = map.get("id").and_then(|v| v.as_str()).map(str::to_string);
            if id.is_some() || map.is_empty() {
                id
            } else {
                Some(serde_json::Value::Object(map).to_string())
            }
        }
        other => Some(other.to_string()),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RestrictRequest {
    is_restricted: bool,
}

/// [`EnvironmentGateway`] backed by the platform's HTTP API
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base: Url,
    credentials: Credentials,
}

impl HttpGateway {
    /// Create a gateway for `base`, which must end in `/`
    /// (see [`crate::normalize_host`]).
    pub fn new(base: Url, credentials: Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("envsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> GatewayResult<Url> {
        self.base.join(path).map_err(|e| GatewayError::Transport {
            url: format!("{}{}", self.base, path),
            message: e.to_string(),
        })
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        let request = self.http.request(method, url.clone());
        self.credentials
            .apply(request)
            .header(ACCEPT, "application/json")
    }

    async fn send(&self, method: Method, path: &str) -> GatewayResult<(Url, String)> {
        let url = self.endpoint(path)?;
        let request = self.request(method.clone(), &url);
        let body = execute(&method, &url, request).await?;
        Ok((url, body))
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> GatewayResult<(Url, String)> {
        let url = self.endpoint(path)?;
        let request = self.request(method.clone(), &url).json(body);
        let body = execute(&method, &url, request).await?;
        Ok((url, body))
    }
}

async fn execute(method: &Method, url: &Url, request: RequestBuilder) -> GatewayResult<String> {
    tracing::debug!(%method, %url, "Sending request");

    let response = request.send().await.map_err(|e| GatewayError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    let status = response.status();
    let body = response.text().await.map_err(|e| GatewayError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    tracing::debug!(%method, %url, status = status.as_u16(), "Received response");

    if !status.is_success() {
        return Err(GatewayError::Status {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn decode<T: DeserializeOwned>(url: &Url, body: &str) -> GatewayResult<T> {
    serde_json::from_str(body).map_err(|e| GatewayError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl EnvironmentGateway for HttpGateway {
    async fn list_environments(&self) -> GatewayResult<Vec<EnvironmentSummary>> {
        let (url, body) = self.send(Method::GET, LIST_PATH).await?;
        let listing: ListResponse = decode(&url, &body)?;
        Ok(listing.data)
    }

    async fn create_environment(&self, payload: &EnvironmentPayload) -> GatewayResult<()> {
        self.send_json(Method::POST, ENVIRONMENTS_PATH, payload).await?;
        Ok(())
    }

    async fn get_environment(&self, id: &str) -> GatewayResult<EnvironmentState> {
        let path = format!("{ENVIRONMENTS_PATH}/{id}");
        let (url, body) = self.send(Method::GET, &path).await?;
        let response: GetResponse = decode(&url, &body)?;
        Ok(response.environment.into())
    }

    async fn create_environment_revision(
        &self,
        id: &str,
        payload: &RevisionPayload,
    ) -> GatewayResult<()> {
        let path = format!("{ENVIRONMENTS_PATH}/{id}/revisions");
        self.send_json(Method::POST, &path, payload).await?;
        Ok(())
    }

    async fn restrict_environment_revision(
        &self,
        id: &str,
        revision_id: &str,
    ) -> GatewayResult<()> {
        let path = format!("{ENVIRONMENTS_PATH}/{id}/revisions/{revision_id}");
        self.send_json(Method::PATCH, &path, &RestrictRequest { is_restricted: true })
            .await?;
        Ok(())
    }

    async fn archive_environment(&self, id: &str) -> GatewayResult<()> {
        let path = format!("{ENVIRONMENTS_PATH}/{id}");
        self.send(Method::DELETE, &path).await?;
        Ok(())
    }
}
