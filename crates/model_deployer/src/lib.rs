//! # Model Deployer
//!
//! Registry of model-serving instances.
//!
//! Responsibilities:
//! - Look up model servers by pipeline, step and model name
//! - Stop a server within a bounded grace period
//! - Persist service status changes in the registry
//! - Provide a mock deployer for orchestration tests
//!
//! ## Registry Layout
//!
//! One JSON `ServiceRecord` per service, stored as `<registry_dir>/<uuid>.json`.
//! A missing directory is treated as an empty registry.

pub mod local;
pub mod mock;
pub mod registry;

pub use contracts::{ModelDeployer, ServiceHandle, ServiceQuery, ServiceRecord, ServiceStatus};
pub use local::{LocalModelDeployer, LocalService};
pub use mock::{MockModelDeployer, MockService};
