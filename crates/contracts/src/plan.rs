//! RunPlan - the single control path chosen per invocation

use serde::Serialize;

/// Control path selected from the CLI flags
///
/// Resolved once at entry. `StopOnly` wins over everything else, so
/// `skip_deploy` has no effect when a stop is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPlan {
    /// Stop the running prediction service and exit
    StopOnly,
    /// Skip the deployment pipeline, run inference
    DeploySkip,
    /// Run the deployment pipeline, then inference
    DeployRun,
}

impl RunPlan {
    /// Resolve the plan from the two flags (first match wins)
    pub fn from_flags(skip_deploy: bool, stop_service: bool) -> Self {
        if stop_service {
            RunPlan::StopOnly
        } else if skip_deploy {
            RunPlan::DeploySkip
        } else {
            RunPlan::DeployRun
        }
    }
}

impl std::fmt::Display for RunPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunPlan::StopOnly => "stop-only",
            RunPlan::DeploySkip => "deploy-skip",
            RunPlan::DeployRun => "deploy-run",
        };
        f.write_str(s)
    }
}
