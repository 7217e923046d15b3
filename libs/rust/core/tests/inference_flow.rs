use capstone_core::{
    ArtifactLoadError, ArtifactLocations, ArtifactStore, FeatureError, FeatureSchema, FeatureSlot, FeatureVector,
    InferenceService, Prediction, RequestError, Task,
};
use serde_json::json;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn regression_schema() -> FeatureSchema {
    FeatureSchema::new(vec![
        FeatureSlot::bounded("temperature", 100.0, 300.0),
        FeatureSlot::continuous("pressure"),
        FeatureSlot::continuous("cycle_time"),
    ])
    .unwrap()
}

fn classification_schema() -> FeatureSchema {
    FeatureSchema::new(vec![
        FeatureSlot::integer("age", 20, 90),
        FeatureSlot::categorical("sex", &[(1, "Male"), (0, "Female")]),
    ])
    .unwrap()
}

fn regression_service() -> InferenceService {
    let locations = ArtifactLocations::new(fixture("linear_model.json"))
        .with_transform(fixture("scaler.json"))
        .with_metadata(fixture("linear_metadata.json"));
    let store = ArtifactStore::load(&locations).unwrap();
    InferenceService::new(store, regression_schema()).unwrap()
}

fn classification_service() -> InferenceService {
    let store = ArtifactStore::load(&ArtifactLocations::new(fixture("forest_model.json"))).unwrap();
    InferenceService::new(store, classification_schema()).unwrap()
}

#[test]
fn regression_fixture_yields_known_value() {
    let svc = regression_service();
    assert_eq!(svc.task(), Task::Regression);
    assert_eq!(svc.store().metadata()["model_type"], "Ridge");
    let inputs = serde_json::from_value(json!({"temperature": 220, "pressure": 80.0, "cycle_time": 55.0})).unwrap();
    assert_eq!(svc.predict_inputs("test", &inputs).unwrap(), Prediction::Regression { value: 15.5 });
}

#[test]
fn scaler_inverse_recovers_raw_inputs() {
    let svc = regression_service();
    let inputs = serde_json::from_value(json!({"temperature": 213.7, "pressure": 91.25, "cycle_time": 47.0})).unwrap();
    let raw = FeatureVector::build(svc.schema(), &inputs).unwrap();
    let transform = svc.store().transform().unwrap();
    let back = transform.inverse_transform(&transform.transform(&raw).unwrap()).unwrap();
    for (a, b) in raw.as_ordered_sequence().iter().zip(back.as_ordered_sequence()) {
        assert!((a - b).abs() < 1e-9, "{a} vs {b}");
    }
}

#[test]
fn forest_fixture_averages_tree_votes() {
    let svc = classification_service();
    let inputs = serde_json::from_value(json!({"age": 60, "sex": 1})).unwrap();
    assert_eq!(svc.predict_inputs("test", &inputs).unwrap(), Prediction::Classification { label: 1, probability: 0.875 });

    let inputs = serde_json::from_value(json!({"age": 30, "sex": 0})).unwrap();
    match svc.predict_inputs("test", &inputs).unwrap() {
        Prediction::Classification { label, probability } => {
            assert_eq!(label, 0);
            assert!((probability - 0.225).abs() < 1e-12);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn invalid_category_never_reaches_the_model() {
    let svc = classification_service();
    let inputs = serde_json::from_value(json!({"age": 60, "sex": 2})).unwrap();
    let err = svc.predict_inputs("test", &inputs).unwrap_err();
    assert!(err.is_rejection());
    assert!(matches!(err, RequestError::Features(FeatureError::InvalidValue { ref feature, .. }) if feature == "sex"));
}

#[test]
fn extra_key_is_schema_mismatch() {
    let svc = classification_service();
    let inputs = serde_json::from_value(json!({"age": 60, "sex": 1, "cholesterol": 200})).unwrap();
    assert_eq!(svc.predict_inputs("test", &inputs).unwrap_err().kind(), "schema_mismatch");
}

#[test]
fn missing_model_file_prevents_service_creation() {
    let err = ArtifactStore::load(&ArtifactLocations::new(fixture("does_not_exist.json"))).unwrap_err();
    assert!(matches!(err, ArtifactLoadError::Missing { artifact: "model", .. }));
}

#[test]
fn artifacts_for_another_schema_are_refused() {
    let store = ArtifactStore::load(&ArtifactLocations::new(fixture("forest_model.json"))).unwrap();
    let err = InferenceService::new(store, regression_schema()).unwrap_err();
    assert!(matches!(err, ArtifactLoadError::SchemaMismatch { .. }));
}
