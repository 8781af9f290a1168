//! Pipeline trait - external pipeline abstraction
//!
//! A pipeline is an opaque unit of work owned by the ML framework
//! (training, deployment, batch inference). The runner only starts it and
//! waits for it to finish.

use crate::ContractError;

/// Runnable pipeline
///
/// Real (process-backed) and mock pipelines implement this trait.
/// `run` has no deadline: it returns when the pipeline is done.
#[trait_variant::make(Pipeline: Send)]
pub trait LocalPipeline {
    /// Pipeline name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Run the pipeline to completion
    ///
    /// # Errors
    /// Returns the pipeline failure unmodified
    async fn run(&self) -> Result<(), ContractError>;
}
