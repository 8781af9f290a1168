//! Configuration validation
//!
//! Rules:
//! - Field rules (non-empty names, stop_timeout_secs > 0) are declared with the `validator` derive
//! - registry_dir is not empty
//! - Environment variable names are well formed
//! - working_dir is not empty

use contracts::{ContractError, DeployConfig, PipelineCommand};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Validate a `DeployConfig`
///
/// Returns the first error found.
pub fn validate(config: &DeployConfig) -> Result<(), ContractError> {
    validate_fields(config)?;
    validate_registry(config)?;
    validate_command("pipelines.deployment", &config.pipelines.deployment)?;
    validate_command("pipelines.inference", &config.pipelines.inference)?;
    Ok(())
}

/// Run the derive-declared field rules
fn validate_fields(config: &DeployConfig) -> Result<(), ContractError> {
    let Err(errors) = config.validate() else {
        return Ok(());
    };

    let mut flat = Vec::new();
    flatten_errors("", &errors, &mut flat);
    // HashMap order is unstable; sort before picking the first
    flat.sort();

    match flat.into_iter().next() {
        Some((field, message)) => Err(ContractError::config_validation(field, message)),
        None => Err(ContractError::config_validation("<root>", errors.to_string())),
    }
}

fn flatten_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<(String, String)>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    out.push((path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    flatten_errors(&format!("{path}[{idx}]"), inner, out);
                }
            }
        }
    }
}

fn validate_registry(config: &DeployConfig) -> Result<(), ContractError> {
    if config.deployer.registry_dir.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "deployer.registry_dir",
            "registry_dir cannot be empty",
        ));
    }
    Ok(())
}

/// Check a pipeline launch command
fn validate_command(field: &str, command: &PipelineCommand) -> Result<(), ContractError> {
    if command.program.trim().is_empty() {
        return Err(ContractError::config_validation(
            format!("{field}.program"),
            "program cannot be blank",
        ));
    }

    for key in command.env.keys() {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(ContractError::config_validation(
                format!("{field}.env"),
                format!("invalid environment variable name '{key}'"),
            ));
        }
    }

    if let Some(dir) = &command.working_dir {
        if dir.as_os_str().is_empty() {
            return Err(ContractError::config_validation(
                format!("{field}.working_dir"),
                "working_dir cannot be empty",
            ));
        }
    }

    Ok(())
}
