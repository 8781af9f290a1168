//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_deployment;
pub use validate::run_validate;

use std::path::Path;

use contracts::DeployConfig;
use tracing::{debug, info};

use crate::error::CliError;

/// Load the config file, or built-in defaults when it does not exist
fn load_config(path: &Path) -> Result<DeployConfig, CliError> {
    let (config, from_file) = config_loader::ConfigLoader::load_or_default(path)
        .map_err(|e| CliError::config(path.display().to_string(), e))?;

    if from_file {
        info!(config = %path.display(), "Configuration loaded");
    } else {
        debug!(config = %path.display(), "No configuration file, using defaults");
    }
    Ok(config)
}
