//! # Integration Tests
//!
//! Cross-crate tests.
//!
//! - Contract checks
//! - End-to-end runs with real process pipelines and a local registry (unix)

#[cfg(test)]
mod contract_tests {
    use contracts::{DeployConfig, RunPlan, ServiceQuery};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_default_config_targets_prices_predictor() {
        let config = DeployConfig::default();
        assert_eq!(config.service_query(), ServiceQuery::default());
        assert_eq!(config.stop_timeout().as_secs(), 10);
    }

    #[test]
    fn test_plan_truth_table() {
        let cases = [
            ((false, false), RunPlan::DeployRun),
            ((true, false), RunPlan::DeploySkip),
            ((false, true), RunPlan::StopOnly),
            ((true, true), RunPlan::StopOnly),
        ];
        for ((skip, stop), expected) in cases {
            assert_eq!(RunPlan::from_flags(skip, stop), expected, "skip={skip} stop={stop}");
        }
    }
}

#[cfg(all(test, unix))]
mod e2e_tests {
    use std::path::{Path, PathBuf};

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        ContractError, DeployConfig, PipelineCommand, RunPlan, ServiceRecord, ServiceStatus,
    };
    use model_deployer::{registry, LocalModelDeployer};
    use orchestrator::{DeploymentOrchestrator, OrchestratorSettings, StepOutcome};
    use pipeline_runner::{CommandPipeline, DEPLOYMENT_PIPELINE, INFERENCE_PIPELINE};

    /// Test workspace: a temp dir with a registry and an append-only journal
    struct Workspace {
        dir: tempfile::TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn registry(&self) -> PathBuf {
            self.dir.path().join("services")
        }

        fn journal(&self) -> PathBuf {
            self.dir.path().join("journal.log")
        }

        fn journal_lines(&self) -> Vec<String> {
            std::fs::read_to_string(self.journal())
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect()
        }

        /// Command that appends `entry` to the journal and exits with `code`
        fn journal_command(&self, entry: &str, code: i32) -> PipelineCommand {
            PipelineCommand::new(
                "sh",
                [
                    "-c".to_string(),
                    format!("echo {entry} >> '{}'; exit {code}", self.journal().display()),
                ],
            )
        }

        fn config(&self, deploy_exit: i32, infer_exit: i32) -> DeployConfig {
            let mut config = DeployConfig::default();
            config.deployer.registry_dir = self.registry();
            config.tracking.uri = format!("file:{}", self.dir.path().join("mlruns").display());
            config.pipelines.deployment = self.journal_command("deploy", deploy_exit);
            config.pipelines.inference = self.journal_command("inference", infer_exit);
            config
        }

        fn running_record(&self, uuid: &str) -> ServiceRecord {
            let mut record = ServiceRecord::new(
                uuid,
                "continuous_deployment_pipeline",
                "mlflow_model_deployer_step",
                "prices_predictor",
            );
            record.shutdown_command = vec![
                "sh".to_string(),
                "-c".to_string(),
                format!("echo stop-{uuid} >> '{}'", self.journal().display()),
            ];
            record
        }
    }

    async fn run(
        config: &DeployConfig,
        plan: RunPlan,
    ) -> (Result<orchestrator::RunReport, ContractError>, String) {
        let mut orch = DeploymentOrchestrator::new(
            LocalModelDeployer::from_config(&config.deployer),
            CommandPipeline::new(DEPLOYMENT_PIPELINE, config.pipelines.deployment.clone()),
            CommandPipeline::new(INFERENCE_PIPELINE, config.pipelines.inference.clone()),
            OrchestratorSettings::from_config(config),
            Vec::new(),
        );
        let result = orch.run(plan).await;
        let output = String::from_utf8(orch.into_console()).unwrap();
        (result, output)
    }

    async fn status_of(registry_dir: &Path, uuid: &str) -> ServiceStatus {
        registry::read_record(&registry::record_path(registry_dir, uuid))
            .await
            .unwrap()
            .status
    }

    /// No flags: deploy, then inference, then the closing summary
    #[tokio::test]
    async fn test_e2e_full_run() {
        let ws = Workspace::new();
        let config = ws.config(0, 0);

        let (result, output) = run(&config, RunPlan::from_flags(false, false)).await;
        let report = result.unwrap();

        assert_eq!(ws.journal_lines(), vec!["deploy", "inference"]);
        assert!(report.deployment.completed());
        assert!(report.inference.completed());
        assert!(output.contains("Running full deployment pipeline..."));
        assert!(output.contains(&format!(
            "mlflow ui --backend-store-uri {}",
            config.tracking.uri
        )));
    }

    /// --skip-deploy: inference only
    #[tokio::test]
    async fn test_e2e_skip_deploy() {
        let ws = Workspace::new();
        let config = ws.config(0, 0);

        let (result, output) = run(&config, RunPlan::from_flags(true, false)).await;
        let report = result.unwrap();

        assert_eq!(ws.journal_lines(), vec!["inference"]);
        assert_eq!(report.deployment, StepOutcome::Skipped);
        assert!(output.contains("assuming model is served manually"));
        assert!(output.contains("Next steps:"));
    }

    /// --stop-service with two running services: only the first is stopped
    #[tokio::test]
    async fn test_e2e_stop_first_of_two() {
        let ws = Workspace::new();
        let config = ws.config(0, 0);
        let deployer = LocalModelDeployer::from_config(&config.deployer);
        deployer.register(&ws.running_record("A")).await.unwrap();
        deployer.register(&ws.running_record("B")).await.unwrap();

        let (result, output) = run(&config, RunPlan::from_flags(true, true)).await;
        let report = result.unwrap();

        assert_eq!(report.stopped_service.as_deref(), Some("A"));
        assert_eq!(ws.journal_lines(), vec!["stop-A"]);
        assert_eq!(status_of(&ws.registry(), "A").await, ServiceStatus::Stopped);
        assert_eq!(status_of(&ws.registry(), "B").await, ServiceStatus::Running);
        assert!(!output.contains("Next steps:"));
    }

    /// --stop-service with stopped or foreign services only: nothing happens
    #[tokio::test]
    async fn test_e2e_stop_without_match() {
        let ws = Workspace::new();
        let config = ws.config(0, 0);
        let deployer = LocalModelDeployer::from_config(&config.deployer);

        let mut stopped = ws.running_record("old");
        stopped.status = ServiceStatus::Stopped;
        deployer.register(&stopped).await.unwrap();
        let mut foreign = ws.running_record("foreign");
        foreign.model_name = "other_model".to_string();
        deployer.register(&foreign).await.unwrap();

        let (result, output) = run(&config, RunPlan::StopOnly).await;

        assert!(result.unwrap().stopped_service.is_none());
        assert!(ws.journal_lines().is_empty());
        assert!(output.contains("No running prediction service found"));
    }

    /// A failing deployment pipeline aborts the run before inference
    #[tokio::test]
    async fn test_e2e_deploy_failure_propagates() {
        let ws = Workspace::new();
        let config = ws.config(4, 0);

        let (result, output) = run(&config, RunPlan::DeployRun).await;

        match result {
            Err(ContractError::PipelineFailed { pipeline, code }) => {
                assert_eq!(pipeline, DEPLOYMENT_PIPELINE);
                assert_eq!(code, Some(4));
            }
            other => panic!("expected pipeline failure, got {other:?}"),
        }
        assert_eq!(ws.journal_lines(), vec!["deploy"]);
        assert!(!output.contains("Next steps:"));
    }

    /// Config loaded from TOML drives the same run
    #[tokio::test]
    async fn test_e2e_config_from_toml() {
        let ws = Workspace::new();
        let toml = format!(
            r#"
[tracking]
uri = "sqlite:///mlflow.db"

[deployer]
registry_dir = "{registry}"

[pipelines.deployment]
program = "sh"
args = ["-c", "echo deploy-from-toml >> '{journal}'"]

[pipelines.inference]
program = "sh"
args = ["-c", "echo infer-from-toml >> '{journal}'"]
"#,
            registry = ws.registry().display(),
            journal = ws.journal().display(),
        );
        let config = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        let (result, output) = run(&config, RunPlan::DeployRun).await;
        result.unwrap();

        assert_eq!(
            ws.journal_lines(),
            vec!["deploy-from-toml", "infer-from-toml"]
        );
        assert!(output.contains("mlflow ui --backend-store-uri sqlite:///mlflow.db"));
    }
}
