//! Layered error definitions
//!
//! Categorized by source: config / pipeline / deployer

use std::time::Duration;

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Pipeline Errors =====
    /// Pipeline process could not be started
    #[error("failed to launch pipeline '{pipeline}': {message}")]
    PipelineSpawn { pipeline: String, message: String },

    /// Pipeline process exited unsuccessfully
    #[error("pipeline '{pipeline}' failed with {}", exit_description(.code))]
    PipelineFailed { pipeline: String, code: Option<i32> },

    // ===== Deployer Errors =====
    /// Service registry could not be read
    #[error("failed to read service registry '{path}': {message}")]
    RegistryRead { path: String, message: String },

    /// Service record is malformed
    #[error("malformed service record '{path}': {message}")]
    RecordParse { path: String, message: String },

    /// Stop request failed
    #[error("failed to stop service '{service}': {message}")]
    StopFailed { service: String, message: String },

    /// Stop request did not finish in time
    #[error("service '{service}' did not stop within {}s", .timeout.as_secs())]
    StopTimeout { service: String, timeout: Duration },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "termination by signal".to_string(),
    }
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create pipeline spawn error
    pub fn pipeline_spawn(pipeline: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PipelineSpawn {
            pipeline: pipeline.into(),
            message: message.into(),
        }
    }

    /// Create pipeline failure error
    pub fn pipeline_failed(pipeline: impl Into<String>, code: Option<i32>) -> Self {
        Self::PipelineFailed {
            pipeline: pipeline.into(),
            code,
        }
    }

    /// Create stop failure error
    pub fn stop_failed(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StopFailed {
            service: service.into(),
            message: message.into(),
        }
    }
}
