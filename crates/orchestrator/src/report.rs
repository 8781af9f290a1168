//! Run report

use std::time::Duration;

use contracts::RunPlan;

/// Result of one pipeline step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepOutcome {
    /// Not part of the selected plan
    #[default]
    NotRun,
    /// Deliberately skipped (`--skip-deploy`)
    Skipped,
    /// Ran to completion
    Completed { duration: Duration },
}

impl StepOutcome {
    pub fn completed(&self) -> bool {
        matches!(self, StepOutcome::Completed { .. })
    }
}

impl std::fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepOutcome::NotRun => f.write_str("not run"),
            StepOutcome::Skipped => f.write_str("skipped"),
            StepOutcome::Completed { duration } => {
                write!(f, "completed in {:.2}s", duration.as_secs_f64())
            }
        }
    }
}

/// What a single invocation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Selected control path
    pub plan: RunPlan,

    /// Deployment pipeline step
    pub deployment: StepOutcome,

    /// Inference pipeline step
    pub inference: StepOutcome,

    /// UUID of the service stopped on the stop-only path
    pub stopped_service: Option<String>,

    /// Tracking store the pipelines log to
    pub tracking_uri: String,
}

impl RunReport {
    pub fn new(plan: RunPlan, tracking_uri: impl Into<String>) -> Self {
        Self {
            plan,
            deployment: StepOutcome::NotRun,
            inference: StepOutcome::NotRun,
            stopped_service: None,
            tracking_uri: tracking_uri.into(),
        }
    }

    /// Terminal state reached by this run
    pub fn terminal_state(&self) -> &'static str {
        match self.plan {
            RunPlan::StopOnly => "stopped-service-only",
            RunPlan::DeployRun => "deployed-and-inferred",
            RunPlan::DeploySkip => "skipped-deploy-and-inferred",
        }
    }
}
