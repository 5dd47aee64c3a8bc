//! Reconciliation engine for envsync
//!
//! This crate keeps remote platform environments in step with the
//! declarations under a target directory:
//!
//! - **Gateway contract**: [`EnvironmentGateway`], the only way the engine talks
//!   to the remote platform
//! - **Reconciler**: create-or-revise decision for one declaration, driven by
//!   the content fingerprint
//! - **Restriction**: one-way lock of the selected revision
//! - **SyncEngine**: discovery and failure-isolated batch processing
//!
//! # Architecture
//!
//! ```text
//!                   envsync-cli
//!                    |       |
//!          envsync-core    envsync-client
//!                    |       |
//!                 envsync-config
//! ```

pub mod discovery;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod payload;
pub mod reconcile;
pub mod report;
pub mod restriction;

pub use discovery::{EnvironmentEntry, discover_environments};
pub use engine::{SyncEngine, SyncOptions};
pub use error::{Error, Result};
pub use gateway::{
    EnvironmentGateway, EnvironmentState, EnvironmentSummary, GatewayError, GatewayResult,
    RevisionRef, find_environment,
};
pub use payload::{EnvironmentPayload, RevisionPayload};
pub use reconcile::{ReconcileAction, ReconcileReport, Reconciler, RemoteState};
pub use report::{BatchReport, EnvironmentOutcome, EnvironmentResult};
pub use restriction::{RestrictionOutcome, enforce_restriction};
