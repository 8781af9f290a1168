//! Console status lines

pub const DEPLOY_RUN_MESSAGE: &str = "Running full deployment pipeline...";

pub const DEPLOY_SKIP_MESSAGE: &str =
    "Skipping deployment step — assuming model is served manually.";

pub const INFERENCE_MESSAGE: &str = "Running inference pipeline...";

/// Closing summary with the tracking UI hint
pub fn next_steps(tracking_uri: &str) -> String {
    format!(
        "\nNext steps:\n\
         1. Check your model predictions in the pipeline logs above.\n\
         2. To explore your experiments: mlflow ui --backend-store-uri {tracking_uri}\n"
    )
}

pub fn stopped_service(uuid: &str) -> String {
    format!("Stopped prediction service {uuid}")
}

pub fn no_running_service(model_name: &str) -> String {
    format!("No running prediction service found for model '{model_name}'")
}
