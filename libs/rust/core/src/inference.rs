//! Scale → predict orchestration.
//!
//! [`predict`] is a pure function of the store and the feature vector: it
//! has no hidden inputs, so identical arguments give a bit-identical
//! [`Prediction`].

use serde::Serialize;
use std::time::Instant;
use tracing::{debug, error, instrument, warn};

use crate::artifact::{ArtifactStore, Label, ModelArtifact, Task};
use crate::error::{ArtifactLoadError, PredictionError, RequestError};
use crate::features::{FeatureInputs, FeatureSchema, FeatureVector};
use crate::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum Prediction {
    Regression { value: f64 },
    Classification { label: Label, probability: f64 },
}

impl Prediction {
    pub fn task(&self) -> Task {
        match self {
            Prediction::Regression { .. } => Task::Regression,
            Prediction::Classification { .. } => Task::Classification,
        }
    }
}

/// Run one prediction against the store's artifacts.
pub fn predict(store: &ArtifactStore, features: &FeatureVector) -> Result<Prediction, PredictionError> {
    let model = store.model();
    if !features.schema().matches_names(model.feature_names()) {
        return Err(PredictionError::Shape {
            expected: model.feature_names().to_vec(),
            found: features.schema().name_list(),
        });
    }

    let scaled = match store.transform() {
        Some(t) => t.transform(features)?,
        None => features.clone(),
    };
    let x = scaled.as_ordered_sequence();

    if let Some(regressor) = model.as_regressor() {
        let value = regressor.predict(x)?;
        if !value.is_finite() {
            return Err(PredictionError::NonFinite);
        }
        return Ok(Prediction::Regression { value });
    }

    match model.as_classifier() {
        Some(classifier) => {
            let label = classifier.predict(x)?;
            let probability = classifier.predict_probability(x)?;
            if !probability.is_finite() {
                return Err(PredictionError::NonFinite);
            }
            if !(0.0..=1.0).contains(&probability) {
                return Err(PredictionError::InvalidProbability(probability));
            }
            Ok(Prediction::Classification { label, probability })
        }
        None => Err(PredictionError::Model(format!("{} has no prediction capability", model.kind()))),
    }
}

/// A loaded store bound to the deployment schema it serves.
#[derive(Debug)]
pub struct InferenceService {
    store: ArtifactStore,
    schema: FeatureSchema,
}

impl InferenceService {
    /// Fails when the artifacts were fitted on a different feature list than
    /// `schema`, including the same names in another order.
    pub fn new(store: ArtifactStore, schema: FeatureSchema) -> Result<Self, ArtifactLoadError> {
        check_fitted_on(store.model().feature_names(), "model", &schema)?;
        if let Some(t) = store.transform() {
            check_fitted_on(t.feature_names(), "transform", &schema)?;
        }
        Ok(Self { store, schema })
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn task(&self) -> Task {
        self.store.model().task()
    }

    pub fn model(&self) -> &ModelArtifact {
        self.store.model()
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, PredictionError> {
        predict(&self.store, features)
    }

    /// Validate raw inputs and predict; the request boundary used by handlers.
    #[instrument(skip_all, fields(service = service))]
    pub fn predict_inputs(&self, service: &str, inputs: &FeatureInputs) -> Result<Prediction, RequestError> {
        let start = Instant::now();
        let result = FeatureVector::build(&self.schema, inputs)
            .map_err(RequestError::from)
            .and_then(|fv| self.predict(&fv).map_err(RequestError::from));
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let outcome = match &result {
            Ok(prediction) => {
                debug!(?prediction, latency_ms, "prediction served");
                "ok"
            }
            Err(e) if e.is_rejection() => {
                warn!(error = %e, kind = e.kind(), "prediction request rejected");
                "rejected"
            }
            Err(e) => {
                error!(error = %e, kind = e.kind(), "prediction failed");
                "failed"
            }
        };
        metrics::record_prediction(service, outcome, latency_ms);
        result
    }
}

fn check_fitted_on(names: &[String], artifact: &'static str, schema: &FeatureSchema) -> Result<(), ArtifactLoadError> {
    if schema.matches_names(names) {
        Ok(())
    } else {
        Err(ArtifactLoadError::SchemaMismatch { artifact, expected: schema.name_list(), found: names.to_vec() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{LinearRegression, LogisticRegression, Metadata, StandardScaler, TransformArtifact};
    use crate::error::FeatureError;
    use crate::features::FeatureSlot;
    use serde_json::json;

    fn names() -> Vec<String> {
        vec!["x".into(), "y".into()]
    }

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec![FeatureSlot::continuous("x"), FeatureSlot::integer("y", 0, 10)]).unwrap()
    }

    fn inputs(x: f64, y: i64) -> FeatureInputs {
        serde_json::from_value(json!({"x": x, "y": y})).unwrap()
    }

    fn regression_service() -> InferenceService {
        let model = ModelArtifact::LinearRegression(LinearRegression { feature_names: names(), coefficients: vec![3.0, -1.0], intercept: 0.5 });
        let scaler = TransformArtifact::StandardScaler(StandardScaler {
            feature_names: names(),
            mean: vec![1.0, 5.0],
            scale: vec![2.0, 5.0],
            with_mean: true,
            with_std: true,
        });
        let store = ArtifactStore::from_parts(model, Some(scaler), Metadata::new()).unwrap();
        InferenceService::new(store, schema()).unwrap()
    }

    fn classification_service() -> InferenceService {
        let model = ModelArtifact::LogisticRegression(LogisticRegression {
            feature_names: names(),
            classes: vec![0, 1],
            positive_class: None,
            coefficients: vec![0.8, 0.3],
            intercept: -2.0,
        });
        let store = ArtifactStore::from_parts(model, None, Metadata::new()).unwrap();
        InferenceService::new(store, schema()).unwrap()
    }

    #[test]
    fn regression_scales_before_predicting() {
        let svc = regression_service();
        let fv = FeatureVector::build(svc.schema(), &inputs(5.0, 10)).unwrap();
        // scaled = [(5-1)/2, (10-5)/5] = [2, 1]; y = 0.5 + 6 - 1
        assert_eq!(svc.predict(&fv).unwrap(), Prediction::Regression { value: 5.5 });
    }

    #[test]
    fn classification_reports_label_and_probability() {
        let svc = classification_service();
        match svc.predict_inputs("unit", &inputs(5.0, 2)).unwrap() {
            Prediction::Classification { label, probability } => {
                assert_eq!(label, 1);
                assert!(probability > 0.5 && probability <= 1.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn predictions_are_bit_identical() {
        let svc = regression_service();
        let fv = FeatureVector::build(svc.schema(), &inputs(0.123456789, 7)).unwrap();
        let (a, b) = (svc.predict(&fv).unwrap(), svc.predict(&fv).unwrap());
        match (a, b) {
            (Prediction::Regression { value: a }, Prediction::Regression { value: b }) => assert_eq!(a.to_bits(), b.to_bits()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn schema_order_must_match_artifacts() {
        let model = ModelArtifact::LinearRegression(LinearRegression { feature_names: vec!["y".into(), "x".into()], coefficients: vec![1.0, 1.0], intercept: 0.0 });
        let store = ArtifactStore::from_parts(model, None, Metadata::new()).unwrap();
        let err = InferenceService::new(store, schema()).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::SchemaMismatch { artifact: "model", .. }));
    }

    #[test]
    fn vector_from_foreign_schema_is_rejected() {
        let svc = regression_service();
        let other = FeatureSchema::new(vec![FeatureSlot::continuous("x"), FeatureSlot::continuous("z")]).unwrap();
        let fv = FeatureVector::build(&other, &serde_json::from_value(json!({"x": 1.0, "z": 2.0})).unwrap()).unwrap();
        assert!(matches!(svc.predict(&fv), Err(PredictionError::Shape { .. })));
    }

    #[test]
    fn request_errors_keep_their_category() {
        let svc = regression_service();
        let mut bad = inputs(1.0, 1);
        bad.remove("y");
        assert!(matches!(svc.predict_inputs("unit", &bad), Err(RequestError::Features(FeatureError::SchemaMismatch { .. }))));
        let out_of_range = inputs(1.0, 11);
        assert!(matches!(svc.predict_inputs("unit", &out_of_range), Err(RequestError::Features(FeatureError::InvalidValue { .. }))));
    }

    #[test]
    fn overflowing_regression_output_is_not_returned() {
        let model = ModelArtifact::LinearRegression(LinearRegression { feature_names: names(), coefficients: vec![f64::MAX, f64::MAX], intercept: 0.0 });
        let store = ArtifactStore::from_parts(model, None, Metadata::new()).unwrap();
        let svc = InferenceService::new(store, schema()).unwrap();
        let fv = FeatureVector::build(svc.schema(), &inputs(10.0, 10)).unwrap();
        assert_eq!(svc.predict(&fv), Err(PredictionError::NonFinite));
    }

    #[test]
    fn prediction_serializes_with_task_tag() {
        let v = serde_json::to_value(Prediction::Classification { label: 1, probability: 0.25 }).unwrap();
        assert_eq!(v, json!({"task": "classification", "label": 1, "probability": 0.25}));
    }
}
