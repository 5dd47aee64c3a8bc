//! Error types for envsync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that end the process with a non-zero exit code
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A startup check failed before any environment was processed
    #[error("{message}")]
    Startup { message: String },

    /// Error from envsync-core
    #[error(transparent)]
    Core(#[from] envsync_core::Error),

    /// Error from envsync-client
    #[error(transparent)]
    Client(#[from] envsync_client::ClientError),

    /// Report serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn startup(message: impl Into<String>) -> Self {
        Self::Startup {
            message: message.into(),
        }
    }
}
