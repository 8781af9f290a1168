//! Error types for CLI operations.

use contracts::ContractError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded or is invalid
    #[error("Failed to load configuration from {path}")]
    Config {
        path: String,
        #[source]
        source: ContractError,
    },

    /// Command-line override produced an invalid configuration
    #[error("Invalid command-line override")]
    InvalidOverride {
        #[source]
        source: ContractError,
    },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config(path: impl Into<String>, source: ContractError) -> Self {
        Self::Config {
            path: path.into(),
            source,
        }
    }
}
