//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the deployment runner.
//! Business crates depend only on this crate, reverse dependencies are prohibited.
//!
//! ## Collaborators
//! - `Pipeline`: an external pipeline run to completion
//! - `ModelDeployer` / `ServiceHandle`: the registry of model servers

mod config;
mod deployer;
mod error;
mod pipeline;
mod plan;
mod service;

pub use config::*;
pub use deployer::{ModelDeployer, ServiceHandle};
pub use error::*;
pub use pipeline::{LocalPipeline, Pipeline};
pub use plan::RunPlan;
pub use service::*;
