//! # Pipeline Runner
//!
//! Launches external ML pipelines.
//!
//! Responsibilities:
//! - Run a pipeline as an external command and wait for it (no deadline)
//! - Copy the child's output to the console, mirrored to tracing
//! - Map the exit status to `ContractError`
//! - Provide a recording mock for orchestration tests
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::{Pipeline, PipelineCommand};
//! use pipeline_runner::CommandPipeline;
//!
//! let pipeline = CommandPipeline::new(
//!     "inference_pipeline",
//!     PipelineCommand::new("python", ["run_inference.py"]),
//! );
//! pipeline.run().await?;
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use pipeline_runner::{CallLog, MockPipeline};
//!
//! let log = CallLog::new();
//! let deploy = MockPipeline::new("continuous_deployment_pipeline", log.clone());
//! deploy.run().await?;
//! assert_eq!(log.entries(), vec!["continuous_deployment_pipeline"]);
//! ```

mod command;
mod mock;

// Re-exports
pub use command::{CommandPipeline, OutputMode};
pub use contracts::{Pipeline, PipelineCommand};
pub use mock::{CallLog, MockPipeline};

/// Name reported by the deployment pipeline
pub const DEPLOYMENT_PIPELINE: &str = "continuous_deployment_pipeline";

/// Name reported by the inference pipeline
pub const INFERENCE_PIPELINE: &str = "inference_pipeline";
