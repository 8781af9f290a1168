//! Deployment run (no subcommand).

use std::path::Path;

use anyhow::Result;
use contracts::{DeployConfig, RunPlan};
use model_deployer::LocalModelDeployer;
use orchestrator::{DeploymentOrchestrator, OrchestratorSettings};
use pipeline_runner::{CommandPipeline, DEPLOYMENT_PIPELINE, INFERENCE_PIPELINE};
use tracing::{info, warn};

use super::load_config;
use crate::cli::RunArgs;
use crate::error::CliError;

/// Execute the deployment run
pub async fn run_deployment(config_path: &Path, args: &RunArgs) -> Result<()> {
    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, args)?;

    let plan = resolve_plan(args);

    info!(
        %plan,
        model = %config.model_name,
        tracking_uri = %config.tracking.uri,
        registry = %config.deployer.registry_dir.display(),
        "Starting deployment run"
    );

    let deployer = LocalModelDeployer::from_config(&config.deployer);
    let deployment = CommandPipeline::new(DEPLOYMENT_PIPELINE, config.pipelines.deployment.clone());
    let inference = CommandPipeline::new(INFERENCE_PIPELINE, config.pipelines.inference.clone());

    let mut orchestrator = DeploymentOrchestrator::new(
        deployer,
        deployment,
        inference,
        OrchestratorSettings::from_config(&config),
        std::io::stdout(),
    );

    let report = orchestrator.run(plan).await?;

    info!(state = report.terminal_state(), "Deployment run finished");
    Ok(())
}

/// Resolve the run plan from the flags
///
/// `--stop-service` wins; a simultaneous `--skip-deploy` is reported and ignored.
fn resolve_plan(args: &RunArgs) -> RunPlan {
    if args.stop_service && args.skip_deploy {
        warn!("--skip-deploy has no effect together with --stop-service");
    }
    RunPlan::from_flags(args.skip_deploy, args.stop_service)
}

/// Apply CLI overrides and re-validate
fn apply_overrides(config: &mut DeployConfig, args: &RunArgs) -> Result<(), CliError> {
    if let Some(ref uri) = args.tracking_uri {
        info!(tracking_uri = %uri, "Overriding tracking URI from CLI");
        config.tracking.uri = uri.clone();
        config_loader::ConfigLoader::validate(config)
            .map_err(|source| CliError::InvalidOverride { source })?;
    }
    Ok(())
}
