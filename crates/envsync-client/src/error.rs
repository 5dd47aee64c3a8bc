//! Error types for envsync-client

/// Result type for client construction
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised while setting up the HTTP gateway
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The configured host or proxy is not a usable URL
    #[error("Invalid host '{host}': {message}")]
    InvalidHost { host: String, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    pub fn invalid_host(host: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidHost {
            host: host.into(),
            message: message.to_string(),
        }
    }
}
