//! `validate` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::DeployConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    model_name: String,
    tracking_uri: String,
    registry_dir: String,
    deployment_command: String,
    inference_command: String,
}

/// Execute the `validate` command
pub fn run_validate(config_path: &Path, args: &ValidateArgs) -> Result<()> {
    info!(config = %config_path.display(), "Validating configuration");

    let result = validate_config(config_path);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(config_path: &Path) -> ValidationResult {
    let path = config_path.display().to_string();

    // Check file exists
    if !config_path.exists() {
        return ValidationResult {
            valid: false,
            error: Some(crate::error::CliError::config_not_found(&path).to_string()),
            config_path: path,
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(config_path) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path: path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    model_name: config.model_name.clone(),
                    tracking_uri: config.tracking.uri.clone(),
                    registry_dir: config.deployer.registry_dir.display().to_string(),
                    deployment_command: config.pipelines.deployment.display(),
                    inference_command: config.pipelines.inference.display(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path: path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &DeployConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.deployer.registry_dir.exists() {
        warnings.push(format!(
            "deployer.registry_dir '{}' does not exist - no services have been deployed yet",
            config.deployer.registry_dir.display()
        ));
    }

    for (name, command) in [
        ("deployment", &config.pipelines.deployment),
        ("inference", &config.pipelines.inference),
    ] {
        if let Some(ref dir) = command.working_dir {
            if !dir.is_dir() {
                warnings.push(format!(
                    "pipelines.{name}.working_dir '{}' is not a directory",
                    dir.display()
                ));
            }
        }
    }

    if let Some(local) = config.tracking.uri.strip_prefix("file:") {
        if !Path::new(local).exists() {
            warnings.push(format!(
                "tracking store '{}' does not exist yet - it is created by the first pipeline run",
                config.tracking.uri
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Model: {}", summary.model_name);
            println!("  Tracking URI: {}", summary.tracking_uri);
            println!("  Registry: {}", summary.registry_dir);
            println!("  Deployment: {}", summary.deployment_command);
            println!("  Inference: {}", summary.inference_command);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let result = validate_config(&dir.path().join("deployment.toml"));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("not found"));
    }

    #[test]
    fn test_valid_file_has_summary_and_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployment.toml");
        std::fs::write(
            &path,
            "[deployer]\nregistry_dir = \"/nonexistent/registry\"\n",
        )
        .unwrap();

        let result = validate_config(&path);
        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.model_name, "prices_predictor");
        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("registry_dir")));
    }

    #[test]
    fn test_invalid_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployment.toml");
        std::fs::write(&path, "model_name = \"\"\n").unwrap();

        let result = validate_config(&path);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("model_name"));
    }

    #[test]
    fn test_run_validate_fails_for_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployment.json");
        std::fs::write(&path, "{ \"deployer\": { \"stop_timeout_secs\": 0 } }").unwrap();

        let args = ValidateArgs { json: true };
        assert!(run_validate(&path, &args).is_err());
    }
}
