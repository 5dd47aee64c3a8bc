//! Error types for envsync-config

use std::fmt;
use std::path::PathBuf;

/// Result type for envsync-config operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A single problem found while validating a declaration document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Dotted path of the offending field, e.g. `pluggableWorkspaceTools.jupyter.title`
    pub field: String,
    /// Human-readable description of the problem
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors that can occur while loading a declaration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML declaration at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid declaration at {path}: {}", join_issues(.issues))]
    Invalid {
        path: PathBuf,
        issues: Vec<FieldIssue>,
    },
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Field issues carried by an `Invalid` error, empty for every other variant
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            Self::Invalid { issues, .. } => issues,
            _ => &[],
        }
    }

    /// Whether any reported issue concerns the given field
    pub fn names_field(&self, field: &str) -> bool {
        self.issues().iter().any(|issue| issue.field == field)
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_error_lists_every_issue() {
        let error = ConfigError::Invalid {
            path: PathBuf::from("env/environment.yaml"),
            issues: vec![
                FieldIssue::new("name", "is required"),
                FieldIssue::new("organizationOwnerId", "is not a 24-character hex id"),
            ],
        };

        let display = error.to_string();
        assert!(display.contains("env/environment.yaml"));
        assert!(display.contains("name: is required"));
        assert!(display.contains("organizationOwnerId: is not a 24-character hex id"));
        assert!(error.names_field("name"));
        assert!(!error.names_field("visibility"));
    }

    #[test]
    fn io_error_has_no_issues() {
        let error = ConfigError::io(
            "missing.yaml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(error.issues().is_empty());
    }
}
