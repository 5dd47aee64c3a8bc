//! Shared test utilities for the envsync workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`gateway`]: [`InMemoryGateway`], a recording stand-in for the remote platform
//! - [`templates`]: [`TestTemplates`] builder for `environment_templates` trees

pub mod gateway;
pub mod templates;

pub use gateway::{GatewayCall, InMemoryGateway, Operation, RemoteRecord};
pub use templates::{OWNER_ID, TestTemplates};
