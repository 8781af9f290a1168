//! Run metrics
//!
//! All calls are no-ops until a recorder is installed.

use std::time::Duration;

use contracts::RunPlan;
use metrics::{counter, gauge, histogram};

/// Result label for a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn from_result<T, E>(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Count the control path chosen for this invocation
pub fn record_plan_selected(plan: RunPlan) {
    counter!("run_deployment_plans_total", "plan" => plan.to_string()).increment(1);
}

/// Count a pipeline run and record its duration
pub fn record_pipeline_run(pipeline: &str, outcome: Outcome, duration: Duration) {
    counter!(
        "run_deployment_pipeline_runs_total",
        "pipeline" => pipeline.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    histogram!(
        "run_deployment_pipeline_duration_seconds",
        "pipeline" => pipeline.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Number of services matched by the last lookup
pub fn record_service_lookup(matches: usize) {
    gauge!("run_deployment_matching_services").set(matches as f64);
}

/// Count a stop attempt
pub fn record_service_stop(outcome: Outcome) {
    counter!(
        "run_deployment_services_stopped_total",
        "outcome" => outcome.as_str()
    )
    .increment(1);
}
