//! # Orchestrator
//!
//! Deployment run orchestration.
//!
//! Responsibilities:
//! - Execute exactly one `RunPlan` per invocation
//! - Stop the first matching prediction service (stop-only path)
//! - Run the deployment pipeline (unless skipped), then inference
//! - Print status lines and the closing summary
//!
//! Collaborator failures are returned unmodified; nothing is retried.

mod console;
mod orchestrator;
mod report;

pub use console::{
    next_steps, DEPLOY_RUN_MESSAGE, DEPLOY_SKIP_MESSAGE, INFERENCE_MESSAGE,
};
pub use contracts::RunPlan;
pub use orchestrator::{DeploymentOrchestrator, OrchestratorSettings};
pub use report::{RunReport, StepOutcome};
