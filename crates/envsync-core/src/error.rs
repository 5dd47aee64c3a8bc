//! Error types for envsync-core

use std::path::PathBuf;

use crate::gateway::GatewayError;

/// Result type for envsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling environments
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Target directory is missing or not a directory
    #[error("Target directory does not exist: {path}")]
    TargetDirectory { path: PathBuf },

    /// Target directory holds no environment entries
    #[error("No environments found to build in {path}")]
    NoEnvironments { path: PathBuf },

    /// No remote environment carries the requested name
    #[error("Environment '{name}' not found on the remote platform")]
    EnvironmentNotFound { name: String },

    /// A reconciliation task ended abnormally
    #[error("Reconciliation task failed: {message}")]
    Task { message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Transparent wrappers for underlying errors
    /// Declaration loading or validation error
    #[error(transparent)]
    Config(#[from] envsync_config::ConfigError),

    /// Remote call failure
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error prevents any environment from being processed
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::TargetDirectory { .. } | Self::NoEnvironments { .. } | Self::Io { .. }
        )
    }
}
