//! `info` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::{DeployConfig, PipelineCommand, ServiceRecord};
use model_deployer::LocalModelDeployer;
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    config_path: String,
    model_name: String,
    tracking_uri: String,
    deployer: DeployerInfo,
    pipelines: PipelinesInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    services: Option<Vec<ServiceInfo>>,
}

#[derive(Serialize)]
struct DeployerInfo {
    registry_dir: String,
    pipeline_name: String,
    pipeline_step_name: String,
    stop_timeout_secs: u64,
}

#[derive(Serialize)]
struct PipelinesInfo {
    deployment: CommandInfo,
    inference: CommandInfo,
}

#[derive(Serialize)]
struct CommandInfo {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    working_dir: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    env: Vec<String>,
}

#[derive(Serialize)]
struct ServiceInfo {
    uuid: String,
    model_name: String,
    status: String,
    /// Whether `--stop-service` would target this service's query
    matches: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    prediction_url: Option<String>,
}

/// Execute the `info` command
pub async fn run_info(config_path: &Path, args: &InfoArgs) -> Result<()> {
    info!(config = %config_path.display(), "Loading configuration info");

    let config = load_config(config_path)?;

    let services = if args.services {
        let deployer = LocalModelDeployer::from_config(&config.deployer);
        let records = deployer
            .list_services()
            .await
            .context("Failed to read the service registry")?;
        Some(service_infos(&config, &records))
    } else {
        None
    };

    let info = build_config_info(config_path, &config, services);

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(
    config_path: &Path,
    config: &DeployConfig,
    services: Option<Vec<ServiceInfo>>,
) -> ConfigInfo {
    ConfigInfo {
        config_path: config_path.display().to_string(),
        model_name: config.model_name.clone(),
        tracking_uri: config.tracking.uri.clone(),
        deployer: DeployerInfo {
            registry_dir: config.deployer.registry_dir.display().to_string(),
            pipeline_name: config.deployer.pipeline_name.clone(),
            pipeline_step_name: config.deployer.pipeline_step_name.clone(),
            stop_timeout_secs: config.deployer.stop_timeout_secs,
        },
        pipelines: PipelinesInfo {
            deployment: command_info(&config.pipelines.deployment),
            inference: command_info(&config.pipelines.inference),
        },
        services,
    }
}

fn command_info(command: &PipelineCommand) -> CommandInfo {
    CommandInfo {
        command: command.display(),
        working_dir: command
            .working_dir
            .as_ref()
            .map(|d| d.display().to_string()),
        // Only names: values may hold credentials
        env: command.env.keys().cloned().collect(),
    }
}

fn service_infos(config: &DeployConfig, records: &[ServiceRecord]) -> Vec<ServiceInfo> {
    let query = config.service_query();
    records
        .iter()
        .map(|record| ServiceInfo {
            uuid: record.uuid.clone(),
            model_name: record.model_name.clone(),
            status: record.status.to_string(),
            matches: query.matches(record),
            prediction_url: record.prediction_url.clone(),
        })
        .collect()
}

fn print_config_info(info: &ConfigInfo) {
    println!("\n=== Deployment Configuration ===\n");
    println!("Config: {}", info.config_path);
    println!("Model: {}", info.model_name);
    println!("Tracking URI: {}", info.tracking_uri);

    println!("\nDeployer:");
    println!("  Registry: {}", info.deployer.registry_dir);
    println!(
        "  Deployed by: {} / {}",
        info.deployer.pipeline_name, info.deployer.pipeline_step_name
    );
    println!("  Stop timeout: {}s", info.deployer.stop_timeout_secs);

    println!("\nPipelines:");
    for (name, command) in [
        ("deployment", &info.pipelines.deployment),
        ("inference", &info.pipelines.inference),
    ] {
        println!("  - {}: {}", name, command.command);
        if let Some(ref dir) = command.working_dir {
            println!("      working dir: {}", dir);
        }
        if !command.env.is_empty() {
            println!("      env: {}", command.env.join(", "));
        }
    }

    if let Some(ref services) = info.services {
        println!("\nServices ({}):", services.len());
        for service in services {
            let marker = if service.matches { "*" } else { " " };
            print!(
                "  {} {} ({}, {})",
                marker, service.uuid, service.model_name, service.status
            );
            match service.prediction_url {
                Some(ref url) => println!(" {}", url),
                None => println!(),
            }
        }
        if services.iter().any(|s| s.matches) {
            println!("\n  * targeted by --stop-service");
        }
    }

    println!();
}
