//! DeployConfig - Config Loader output
//!
//! Describes where the tracking store lives, how the deployer registry is
//! laid out and which commands launch the deployment and inference pipelines.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    ServiceQuery, DEFAULT_MODEL_NAME, DEFAULT_PIPELINE_NAME, DEFAULT_PIPELINE_STEP_NAME,
};

/// Grace period handed to a service stop request
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 10;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete runner configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeployConfig {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Model deployed and served
    #[serde(default = "default_model_name")]
    #[validate(length(min = 1, message = "model_name cannot be empty"))]
    pub model_name: String,

    /// Experiment tracking store
    #[serde(default)]
    #[validate(nested)]
    pub tracking: TrackingConfig,

    /// Model deployer registry
    #[serde(default)]
    #[validate(nested)]
    pub deployer: DeployerConfig,

    /// Pipeline launch commands
    #[serde(default)]
    #[validate(nested)]
    pub pipelines: PipelinesConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            model_name: default_model_name(),
            tracking: TrackingConfig::default(),
            deployer: DeployerConfig::default(),
            pipelines: PipelinesConfig::default(),
        }
    }
}

impl DeployConfig {
    /// Query selecting the running server of the configured model
    pub fn service_query(&self) -> ServiceQuery {
        ServiceQuery {
            pipeline_name: self.deployer.pipeline_name.clone(),
            pipeline_step_name: self.deployer.pipeline_step_name.clone(),
            model_name: self.model_name.clone(),
            running: true,
        }
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.deployer.stop_timeout_secs)
    }
}

/// Tracking store location
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrackingConfig {
    /// Backend store URI, e.g. "file:./mlruns"
    #[serde(default = "default_tracking_uri")]
    #[validate(length(min = 1, message = "tracking uri cannot be empty"))]
    pub uri: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            uri: default_tracking_uri(),
        }
    }
}

/// Deployer registry settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeployerConfig {
    /// Directory holding one JSON record per service
    #[serde(default = "default_registry_dir")]
    pub registry_dir: PathBuf,

    /// Pipeline that deploys the model server
    #[serde(default = "default_pipeline_name")]
    #[validate(length(min = 1, message = "pipeline_name cannot be empty"))]
    pub pipeline_name: String,

    /// Step that deploys the model server
    #[serde(default = "default_pipeline_step_name")]
    #[validate(length(min = 1, message = "pipeline_step_name cannot be empty"))]
    pub pipeline_step_name: String,

    /// Stop grace period in seconds
    #[serde(default = "default_stop_timeout_secs")]
    #[validate(range(min = 1, message = "stop_timeout_secs must be > 0"))]
    pub stop_timeout_secs: u64,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            registry_dir: default_registry_dir(),
            pipeline_name: default_pipeline_name(),
            pipeline_step_name: default_pipeline_step_name(),
            stop_timeout_secs: default_stop_timeout_secs(),
        }
    }
}

/// Launch commands for both pipelines
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PipelinesConfig {
    #[serde(default = "default_deployment_command")]
    #[validate(nested)]
    pub deployment: PipelineCommand,

    #[serde(default = "default_inference_command")]
    #[validate(nested)]
    pub inference: PipelineCommand,
}

impl Default for PipelinesConfig {
    fn default() -> Self {
        Self {
            deployment: default_deployment_command(),
            inference: default_inference_command(),
        }
    }
}

/// External command that runs one pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PipelineCommand {
    /// Executable
    #[validate(length(min = 1, message = "program cannot be empty"))]
    pub program: String,

    /// Arguments
    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment variables
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Working directory (defaults to the current one)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl PipelineCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
            working_dir: None,
        }
    }

    /// Shell-like rendering for display
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn default_model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

fn default_tracking_uri() -> String {
    "file:./mlruns".to_string()
}

fn default_registry_dir() -> PathBuf {
    PathBuf::from(".deployer/services")
}

fn default_pipeline_name() -> String {
    DEFAULT_PIPELINE_NAME.to_string()
}

fn default_pipeline_step_name() -> String {
    DEFAULT_PIPELINE_STEP_NAME.to_string()
}

fn default_stop_timeout_secs() -> u64 {
    DEFAULT_STOP_TIMEOUT_SECS
}

fn default_deployment_command() -> PipelineCommand {
    PipelineCommand::new(
        "python",
        [
            "-c",
            "from pipelines.deployment_pipeline import continuous_deployment_pipeline; \
             continuous_deployment_pipeline()",
        ],
    )
}

fn default_inference_command() -> PipelineCommand {
    PipelineCommand::new(
        "python",
        [
            "-c",
            "from pipelines.deployment_pipeline import inference_pipeline; inference_pipeline()",
        ],
    )
}
