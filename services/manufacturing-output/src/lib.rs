//! Parts-per-hour regression for injection moulding runs.
//!
//! Raw machine settings are standardised with the shipped scaler and fed to
//! a ridge model; both were fitted on the columns of [`feature_schema`].

use anyhow::{ensure, Context, Result};
use capstone_core::{ArtifactLocations, ArtifactStore, InferenceService, Prediction, ServiceDefaults, Task};

mod schema;

pub use schema::feature_schema;

pub const SERVICE_NAME: &str = "manufacturing-output";
pub const DEFAULT_HTTP_PORT: u16 = 8080;

pub fn defaults() -> ServiceDefaults {
    ServiceDefaults {
        http_port: DEFAULT_HTTP_PORT,
        artifacts: ArtifactLocations::new("model_artifacts/ridge_model.json")
            .with_transform("model_artifacts/scaler.json")
            .with_metadata("model_artifacts/model_metadata.json"),
    }
}

/// Load the artifacts and bind them to the deployment schema.
pub fn build_service(artifacts: &ArtifactLocations) -> Result<InferenceService> {
    let store = ArtifactStore::load(artifacts).context("loading manufacturing-output artifacts")?;
    ensure!(store.transform().is_some(), "manufacturing-output requires a fitted scaler");
    let service = InferenceService::new(store, feature_schema()?)?;
    ensure!(
        service.task() == Task::Regression,
        "manufacturing-output needs a regression model, got {}",
        service.model().kind()
    );
    Ok(service)
}

pub fn summarize(prediction: &Prediction) -> String {
    match prediction {
        Prediction::Regression { value } => format!("Predicted Parts per Hour: {value:.2}"),
        Prediction::Classification { label, probability } => format!("Predicted class {label} (p={probability:.2})"),
    }
}
