//! Heart disease classification with a pre-fitted random forest.

use anyhow::{ensure, Context, Result};
use capstone_core::{ArtifactLocations, ArtifactStore, InferenceService, Prediction, ServiceDefaults, Task};

mod schema;

pub use schema::feature_schema;

pub const SERVICE_NAME: &str = "heart-disease";
pub const DEFAULT_HTTP_PORT: u16 = 8081;

/// Label the forest emits for a positive diagnosis.
pub const DISEASE_LABEL: i64 = 1;

pub fn defaults() -> ServiceDefaults {
    ServiceDefaults {
        http_port: DEFAULT_HTTP_PORT,
        artifacts: ArtifactLocations::new("saved_models/random_forest_best.json")
            .with_metadata("saved_models/model_metadata.json"),
    }
}

pub fn build_service(artifacts: &ArtifactLocations) -> Result<InferenceService> {
    let store = ArtifactStore::load(artifacts).context("loading heart-disease artifacts")?;
    let service = InferenceService::new(store, feature_schema()?)?;
    ensure!(
        service.task() == Task::Classification,
        "heart-disease needs a classifier, got {}",
        service.model().kind()
    );
    Ok(service)
}

pub fn summarize(prediction: &Prediction) -> String {
    match prediction {
        Prediction::Classification { label, probability } => {
            let verdict = if *label == DISEASE_LABEL { "Heart Disease Detected" } else { "No Heart Disease Detected" };
            format!("{verdict}. Probability of Heart Disease: {:.2}%", probability * 100.0)
        }
        Prediction::Regression { value } => format!("Risk score: {value:.2}"),
    }
}
