//! HTTP gateway for envsync
//!
//! Implements [`envsync_core::EnvironmentGateway`] against the remote
//! platform's REST API using `reqwest`.

pub mod auth;
pub mod error;
pub mod host;
pub mod http;

pub use auth::{API_KEY_HEADER, Credentials};
pub use error::{ClientError, Result};
pub use host::{normalize_host, proxy_base};
pub use http::HttpGateway;
