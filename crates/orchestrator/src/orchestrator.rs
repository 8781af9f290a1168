//! Deployment orchestrator - coordinates deployer and pipelines.
//!
//! The plan is resolved before construction; the orchestrator only executes
//! it. Pipelines run without a deadline, only the service stop is bounded.

use std::io::Write;
use std::time::{Duration, Instant};

use contracts::{
    ContractError, DeployConfig, ModelDeployer, Pipeline, RunPlan, ServiceHandle, ServiceQuery,
};
use observability::{
    record_pipeline_run, record_plan_selected, record_service_lookup, record_service_stop,
    Outcome,
};
use tracing::{debug, info, instrument};

use crate::console;
use crate::report::{RunReport, StepOutcome};

/// Explicit run settings (no ambient lookups)
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Selects the prediction service to stop
    pub service_query: ServiceQuery,

    /// Grace period for the stop request
    pub stop_timeout: Duration,

    /// Tracking store shown in the closing summary
    pub tracking_uri: String,
}

impl OrchestratorSettings {
    pub fn from_config(config: &DeployConfig) -> Self {
        Self {
            service_query: config.service_query(),
            stop_timeout: config.stop_timeout(),
            tracking_uri: config.tracking.uri.clone(),
        }
    }
}

/// Main orchestrator
///
/// Generic over its collaborators so real and mock implementations plug in
/// at the boundary. Status lines go to `console`.
pub struct DeploymentOrchestrator<D, P, I, W> {
    deployer: D,
    deployment: P,
    inference: I,
    settings: OrchestratorSettings,
    console: W,
}

impl<D, P, I, W> DeploymentOrchestrator<D, P, I, W>
where
    D: ModelDeployer,
    P: Pipeline,
    I: Pipeline,
    W: Write,
{
    /// Create a new orchestrator
    pub fn new(
        deployer: D,
        deployment: P,
        inference: I,
        settings: OrchestratorSettings,
        console: W,
    ) -> Self {
        Self {
            deployer,
            deployment,
            inference,
            settings,
            console,
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Give back the console sink (used to inspect captured output)
    pub fn into_console(self) -> W {
        self.console
    }

    /// Execute the plan
    ///
    /// # Errors
    /// Any deployer or pipeline failure, unmodified. Steps after the
    /// failing one do not run.
    #[instrument(name = "orchestrator_run", skip(self, plan), fields(plan = %plan))]
    pub async fn run(&mut self, plan: RunPlan) -> Result<RunReport, ContractError> {
        record_plan_selected(plan);
        let mut report = RunReport::new(plan, &self.settings.tracking_uri);

        match plan {
            RunPlan::StopOnly => {
                report.stopped_service = self.stop_service().await?;
                info!(state = report.terminal_state(), "run finished");
                return Ok(report);
            }
            RunPlan::DeployRun => {
                writeln!(self.console, "{}", console::DEPLOY_RUN_MESSAGE)?;
                let duration = run_timed(&self.deployment).await?;
                report.deployment = StepOutcome::Completed { duration };
            }
            RunPlan::DeploySkip => {
                writeln!(self.console, "{}", console::DEPLOY_SKIP_MESSAGE)?;
                report.deployment = StepOutcome::Skipped;
            }
        }

        writeln!(self.console, "{}", console::INFERENCE_MESSAGE)?;
        let duration = run_timed(&self.inference).await?;
        report.inference = StepOutcome::Completed { duration };

        write!(self.console, "{}", console::next_steps(&self.settings.tracking_uri))?;
        writeln!(self.console)?;
        self.console.flush()?;

        info!(
            state = report.terminal_state(),
            deployment = %report.deployment,
            inference = %report.inference,
            "run finished"
        );
        Ok(report)
    }

    /// Stop the first running service matching the configured query
    ///
    /// Returns the stopped service UUID, or `None` when nothing matched.
    async fn stop_service(&mut self) -> Result<Option<String>, ContractError> {
        let query = &self.settings.service_query;
        let services = self.deployer.find_model_server(query).await?;
        record_service_lookup(services.len());

        let Some(service) = services.first() else {
            info!(model = %query.model_name, "no running prediction service");
            writeln!(self.console, "{}", console::no_running_service(&query.model_name))?;
            return Ok(None);
        };

        if services.len() > 1 {
            debug!(
                matches = services.len(),
                "multiple running services matched, stopping the first only"
            );
        }

        let result = service.stop(self.settings.stop_timeout).await;
        record_service_stop(Outcome::from_result(&result));
        result?;

        writeln!(self.console, "{}", console::stopped_service(service.uuid()))?;
        Ok(Some(service.uuid().to_string()))
    }
}

/// Run a pipeline to completion and measure it
async fn run_timed<T: Pipeline>(pipeline: &T) -> Result<Duration, ContractError> {
    info!(pipeline = pipeline.name(), "running pipeline");
    let start = Instant::now();
    let result = pipeline.run().await;
    let duration = start.elapsed();
    record_pipeline_run(pipeline.name(), Outcome::from_result(&result), duration);
    result.map(|()| duration)
}
