//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Run the prices predictor deployment pipeline
#[derive(Parser, Debug)]
#[command(
    name = "run-deployment",
    author,
    version,
    about = "Run the prices predictor deployment pipeline",
    long_about = "Runs the continuous deployment pipeline followed by the inference pipeline.\n\n\
                  With --skip-deploy the deployment step is skipped and a manually served \n\
                  model is assumed. With --stop-service the running prediction service is \n\
                  stopped and nothing else runs.",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "RUN_DEPLOYMENT_VERBOSE")]
    pub verbose: u8,

    /// Suppress all log output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "RUN_DEPLOYMENT_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Path to configuration file (TOML or JSON); defaults apply if it is missing
    #[arg(
        short,
        long,
        default_value = "deployment.toml",
        global = true,
        env = "RUN_DEPLOYMENT_CONFIG"
    )]
    pub config: PathBuf,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Optional commands; without one the deployment run is executed
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display resolved configuration and deployed services
    Info(InfoArgs),
}

/// Arguments for the deployment run
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Skip the model deployment step (for Windows or manual serving)
    #[arg(long)]
    pub skip_deploy: bool,

    /// Stop the prediction service when done
    #[arg(long)]
    pub stop_service: bool,

    /// Override the experiment tracking store URI from configuration
    #[arg(long, env = "MLFLOW_TRACKING_URI")]
    pub tracking_uri: Option<String>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "RUN_DEPLOYMENT_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// List service records found in the deployer registry
    #[arg(long)]
    pub services: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
