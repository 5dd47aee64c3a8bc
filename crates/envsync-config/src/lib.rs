//! Environment declaration loading for envsync
//!
//! Each environment directory holds one `environment.yaml`. This crate turns
//! that document into an immutable, validated [`EnvironmentDeclaration`] and
//! computes the content fingerprint used to detect changes between runs.

pub mod declaration;
pub mod document;
pub mod error;
pub mod fingerprint;
pub mod rules;

pub use declaration::{DECLARATION_FILE, EnvironmentDeclaration, ProxyConfig, WorkspaceTool};
pub use document::{Description, EnvironmentVariable};
pub use error::{ConfigError, FieldIssue, Result};
pub use fingerprint::{
    fingerprint_bytes, fingerprint_file, fingerprint_reader, read_fingerprinted,
};
pub use rules::{ClusterType, Visibility, resolve_clusters, resolve_visibility, title_case};
