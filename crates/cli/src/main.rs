//! # Run Deployment CLI
//!
//! Entry point for the prices predictor deployment runner.
//!
//! Provides:
//! - Deployment run (deploy + inference, skip-deploy, stop-service)
//! - Configuration validation
//! - Configuration and service registry info

mod cli;
mod commands;
mod error;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::debug;

use cli::{Cli, Commands};
use commands::{run_deployment, run_info, run_validate};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    init_logging(&cli)?;

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        "run-deployment starting"
    );

    // Execute command
    let result = match &cli.command {
        Some(Commands::Validate(args)) => run_validate(&cli.config, args),
        Some(Commands::Info(args)) => run_info(&cli.config, args).await,
        None => run_deployment(&cli.config, &cli.run).await,
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let (default_log_level, force_level) = if cli.quiet {
        ("warn", true)
    } else {
        let level = match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        (level, false)
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: match cli.run.metrics_port {
            0 => None,
            port => Some(port),
        },
        default_log_level: default_log_level.to_string(),
        force_level,
    })
}
