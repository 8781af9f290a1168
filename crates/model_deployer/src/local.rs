//! Local model deployer
//!
//! Backs the `ModelDeployer` contract with a directory of service records.
//! Stopping a service runs its shutdown command and marks the record stopped.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use chrono::Utc;
use contracts::{
    ContractError, DeployerConfig, ModelDeployer, ServiceHandle, ServiceQuery, ServiceRecord,
    ServiceStatus,
};
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use crate::registry;

/// Deployer reading service records from a local registry directory
#[derive(Debug, Clone)]
pub struct LocalModelDeployer {
    registry_dir: PathBuf,
}

impl LocalModelDeployer {
    pub fn new(registry_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry_dir: registry_dir.into(),
        }
    }

    pub fn from_config(config: &DeployerConfig) -> Self {
        Self::new(config.registry_dir.clone())
    }

    pub fn registry_dir(&self) -> &Path {
        &self.registry_dir
    }

    /// Add or replace a service record
    pub async fn register(&self, record: &ServiceRecord) -> Result<PathBuf, ContractError> {
        let path = registry::record_path(&self.registry_dir, &record.uuid);
        registry::write_record(&path, record).await?;
        debug!(uuid = %record.uuid, path = %path.display(), "service registered");
        Ok(path)
    }

    /// Every record in the registry, regardless of status
    pub async fn list_services(&self) -> Result<Vec<ServiceRecord>, ContractError> {
        Ok(registry::list_records(&self.registry_dir)
            .await?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }
}

impl ModelDeployer for LocalModelDeployer {
    type Service = LocalService;

    #[instrument(
        name = "deployer_find_model_server",
        skip(self, query),
        fields(model = %query.model_name, running = query.running)
    )]
    async fn find_model_server(
        &self,
        query: &ServiceQuery,
    ) -> Result<Vec<LocalService>, ContractError> {
        let services: Vec<_> = registry::list_records(&self.registry_dir)
            .await?
            .into_iter()
            .filter(|(_, record)| query.matches(record))
            .map(|(path, record)| LocalService { path, record })
            .collect();

        debug!(matches = services.len(), "model server lookup complete");
        Ok(services)
    }
}

/// Handle to a service stored in the local registry
#[derive(Debug, Clone)]
pub struct LocalService {
    path: PathBuf,
    record: ServiceRecord,
}

impl LocalService {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Command used to stop the service
    fn shutdown_command(&self) -> Result<Vec<String>, ContractError> {
        if !self.record.shutdown_command.is_empty() {
            return Ok(self.record.shutdown_command.clone());
        }

        #[cfg(unix)]
        {
            if let Some(pid) = self.record.pid {
                return Ok(vec!["kill".to_string(), pid.to_string()]);
            }
        }

        Err(ContractError::stop_failed(
            &self.record.uuid,
            "service record has no shutdown command or pid",
        ))
    }

    async fn mark_stopped(&self) -> Result<(), ContractError> {
        let mut record = self.record.clone();
        record.status = ServiceStatus::Stopped;
        record.updated_at = Some(Utc::now());
        registry::write_record(&self.path, &record).await
    }
}

impl ServiceHandle for LocalService {
    fn record(&self) -> &ServiceRecord {
        &self.record
    }

    #[instrument(
        name = "service_stop",
        skip(self),
        fields(uuid = %self.record.uuid, timeout_secs = timeout.as_secs())
    )]
    async fn stop(&self, timeout: Duration) -> Result<(), ContractError> {
        let command = self.shutdown_command()?;
        let uuid = &self.record.uuid;

        let mut child = Command::new(&command[0])
            .args(&command[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ContractError::stop_failed(uuid, e.to_string()))?;

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) if status.success() => {}
            Ok(Ok(status)) => {
                return Err(ContractError::stop_failed(
                    uuid,
                    format!("shutdown command exited with {status}"),
                ));
            }
            Ok(Err(e)) => return Err(ContractError::stop_failed(uuid, e.to_string())),
            Err(_) => {
                warn!("shutdown command timed out, killing it");
                child.kill().await.ok();
                return Err(ContractError::StopTimeout {
                    service: uuid.clone(),
                    timeout,
                });
            }
        }

        self.mark_stopped().await?;
        info!("service stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::read_record;

    fn record(uuid: &str) -> ServiceRecord {
        let mut r = ServiceRecord::new(
            uuid,
            "continuous_deployment_pipeline",
            "mlflow_model_deployer_step",
            "prices_predictor",
        );
        r.shutdown_command = vec!["true".to_string()];
        r
    }

    #[tokio::test]
    async fn test_find_filters_by_query() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = LocalModelDeployer::new(dir.path());

        let running = record("a-running");
        let mut stopped = record("b-stopped");
        stopped.status = ServiceStatus::Stopped;
        let mut other_model = record("c-other");
        other_model.model_name = "other".to_string();
        let mut other_step = record("d-step");
        other_step.pipeline_step_name = "another_step".to_string();

        for r in [&running, &stopped, &other_model, &other_step] {
            deployer.register(r).await.unwrap();
        }

        let found = deployer
            .find_model_server(&ServiceQuery::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].uuid(), "a-running");

        let all_states = deployer
            .find_model_server(&ServiceQuery {
                running: false,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all_states.len(), 2);
    }

    #[tokio::test]
    async fn test_find_in_missing_registry() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = LocalModelDeployer::new(dir.path().join("services"));
        let found = deployer
            .find_model_server(&ServiceQuery::default())
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_list_services_returns_everything() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = LocalModelDeployer::new(dir.path());
        let mut stopped = record("stopped");
        stopped.status = ServiceStatus::Stopped;
        deployer.register(&record("running")).await.unwrap();
        deployer.register(&stopped).await.unwrap();

        assert_eq!(deployer.list_services().await.unwrap().len(), 2);
    }

    #[test]
    fn test_shutdown_command_requires_command_or_pid() {
        let mut r = record("x");
        r.shutdown_command.clear();
        let service = LocalService {
            path: PathBuf::from("x.json"),
            record: r,
        };
        let err = service.shutdown_command().unwrap_err().to_string();
        assert!(err.contains("no shutdown command"), "got: {err}");
    }

    #[cfg(unix)]
    #[test]
    fn test_shutdown_command_falls_back_to_kill() {
        let mut r = record("x");
        r.shutdown_command.clear();
        r.pid = Some(4242);
        let service = LocalService {
            path: PathBuf::from("x.json"),
            record: r,
        };
        assert_eq!(service.shutdown_command().unwrap(), vec!["kill", "4242"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_marks_record_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = LocalModelDeployer::new(dir.path());
        let path = deployer.register(&record("svc")).await.unwrap();

        let found = deployer
            .find_model_server(&ServiceQuery::default())
            .await
            .unwrap();
        found[0].stop(Duration::from_secs(10)).await.unwrap();

        let stored = read_record(&path).await.unwrap();
        assert_eq!(stored.status, ServiceStatus::Stopped);
        assert!(stored.updated_at.is_some());

        // No longer matches the running filter
        let again = deployer
            .find_model_server(&ServiceQuery::default())
            .await
            .unwrap();
        assert!(again.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_failure_keeps_record_running() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = LocalModelDeployer::new(dir.path());
        let mut r = record("svc");
        r.shutdown_command = vec!["false".to_string()];
        let path = deployer.register(&r).await.unwrap();

        let found = deployer
            .find_model_server(&ServiceQuery::default())
            .await
            .unwrap();
        let err = found[0].stop(Duration::from_secs(10)).await.unwrap_err();
        assert!(matches!(err, ContractError::StopFailed { .. }), "got: {err}");
        assert_eq!(read_record(&path).await.unwrap().status, ServiceStatus::Running);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = LocalModelDeployer::new(dir.path());
        let mut r = record("slow");
        r.shutdown_command = vec!["sleep".to_string(), "5".to_string()];
        deployer.register(&r).await.unwrap();

        let found = deployer
            .find_model_server(&ServiceQuery::default())
            .await
            .unwrap();
        let err = found[0].stop(Duration::from_millis(100)).await.unwrap_err();
        assert!(matches!(err, ContractError::StopTimeout { .. }), "got: {err}");
    }
}
