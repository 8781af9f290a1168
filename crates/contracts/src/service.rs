//! Service registry types
//!
//! A `ServiceRecord` describes one model-serving instance as persisted by the
//! deployer. A `ServiceQuery` selects records by the pipeline step that
//! deployed them and the model they serve.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pipeline that deploys the model
pub const DEFAULT_PIPELINE_NAME: &str = "continuous_deployment_pipeline";

/// Step inside the deployment pipeline that starts the model server
pub const DEFAULT_PIPELINE_STEP_NAME: &str = "mlflow_model_deployer_step";

/// Model served by the deployment
pub const DEFAULT_MODEL_NAME: &str = "prices_predictor";

/// Serving instance status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Running,
    Stopped,
    /// Also used for records that carry no status
    #[default]
    Error,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ServiceStatus::Running => "running",
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Persisted description of a serving instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Unique service identifier
    pub uuid: String,

    /// Pipeline that deployed the service
    pub pipeline_name: String,

    /// Step that deployed the service
    pub pipeline_step_name: String,

    /// Served model name
    pub model_name: String,

    /// Current status; a record without one is never a stop target
    #[serde(default)]
    pub status: ServiceStatus,

    /// Prediction endpoint (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_url: Option<String>,

    /// Server process id, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    /// Command that shuts the server down (program followed by args)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shutdown_command: Vec<String>,

    /// Last status change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ServiceRecord {
    /// Create a running record for the given deployment coordinates
    pub fn new(
        uuid: impl Into<String>,
        pipeline_name: impl Into<String>,
        pipeline_step_name: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            pipeline_name: pipeline_name.into(),
            pipeline_step_name: pipeline_step_name.into(),
            model_name: model_name.into(),
            status: ServiceStatus::Running,
            prediction_url: None,
            pid: None,
            shutdown_command: Vec::new(),
            updated_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == ServiceStatus::Running
    }
}

/// Model server lookup criteria
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceQuery {
    pub pipeline_name: String,
    pub pipeline_step_name: String,
    pub model_name: String,
    /// Only match running services
    pub running: bool,
}

impl Default for ServiceQuery {
    fn default() -> Self {
        Self {
            pipeline_name: DEFAULT_PIPELINE_NAME.to_string(),
            pipeline_step_name: DEFAULT_PIPELINE_STEP_NAME.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            running: true,
        }
    }
}

impl ServiceQuery {
    /// Check whether a record satisfies this query
    pub fn matches(&self, record: &ServiceRecord) -> bool {
        record.pipeline_name == self.pipeline_name
            && record.pipeline_step_name == self.pipeline_step_name
            && record.model_name == self.model_name
            && (!self.running || record.is_running())
    }
}
