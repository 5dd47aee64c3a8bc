//! Request authentication

use reqwest::RequestBuilder;

/// Header carrying a platform API key
pub const API_KEY_HEADER: &str = "X-Domino-Api-Key";

/// How requests are authenticated
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// User API key, sent in [`API_KEY_HEADER`]
    ApiKey(String),
    /// Service account token, sent as a bearer token
    Bearer(String),
    /// The local API proxy authenticates on our behalf
    Proxy,
}

impl Credentials {
    /// Pick credentials from the configured values. An API key takes
    /// precedence over a token; empty values count as unset.
    pub fn from_options(api_key: Option<&str>, auth_token: Option<&str>) -> Option<Self> {
        match (present(api_key), present(auth_token)) {
            (Some(key), _) => Some(Self::ApiKey(key.to_string())),
            (None, Some(token)) => Some(Self::Bearer(token.to_string())),
            (None, None) => None,
        }
    }

    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::ApiKey(key) => request.header(API_KEY_HEADER, key),
            Self::Bearer(token) => request.bearer_auth(token),
            Self::Proxy => request,
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// Secrets stay out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(***)"),
            Self::Bearer(_) => f.write_str("Bearer(***)"),
            Self::Proxy => f.write_str("Proxy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_wins_over_token() {
        assert_eq!(
            Credentials::from_options(Some("key"), Some("token")),
            Some(Credentials::ApiKey("key".into()))
        );
        assert_eq!(
            Credentials::from_options(Some(""), Some("token")),
            Some(Credentials::Bearer("token".into()))
        );
        assert_eq!(Credentials::from_options(None, Some("  ")), None);
    }

    #[test]
    fn blank_values_are_not_present() {
        assert_eq!(present(Some(" \t")), None);
        assert_eq!(present(Some("key")), Some("key"));
        assert_eq!(present(None), None);
    }

    #[test]
    fn debug_hides_secrets() {
        let rendered = format!("{:?}", Credentials::Bearer("s3cret".into()));
        assert!(!rendered.contains("s3cret"));
    }
}
