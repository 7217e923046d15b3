//! Error taxonomy for artifact loading and per-request inference.
//!
//! Startup failures (`ArtifactLoadError`) are fatal for a service instance.
//! Everything else is scoped to a single request and leaves the loaded
//! artifacts untouched.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("{artifact} artifact not found at {}", path.display())]
    Missing { artifact: &'static str, path: PathBuf },
    #[error("{artifact} artifact at {} unreadable: {source}", path.display())]
    Io { artifact: &'static str, path: PathBuf, #[source] source: std::io::Error },
    #[error("{artifact} artifact at {} malformed: {source}", path.display())]
    Malformed { artifact: &'static str, path: PathBuf, #[source] source: serde_json::Error },
    #[error("{artifact} artifact invalid: {reason}")]
    Invalid { artifact: &'static str, reason: String },
    #[error("{artifact} artifact digest mismatch expected={expected} got={actual}")]
    DigestMismatch { artifact: &'static str, expected: String, actual: String },
    #[error("{artifact} artifact fitted on {found:?}, deployment expects {expected:?}")]
    SchemaMismatch { artifact: &'static str, expected: Vec<String>, found: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("feature set mismatch: missing={missing:?} unexpected={unexpected:?}")]
    SchemaMismatch { missing: Vec<String>, unexpected: Vec<String> },
    #[error("invalid value for {feature}: {reason}")]
    InvalidValue { feature: String, reason: String },
    #[error("duplicate feature slot {0}")]
    DuplicateSlot(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("transform expects {expected} features, got {found}")]
    Shape { expected: usize, found: usize },
    #[error("transform produced non-finite value for {feature}")]
    NonFinite { feature: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),
    #[error("model expects features {expected:?}, got {found:?}")]
    Shape { expected: Vec<String>, found: Vec<String> },
    #[error("model produced non-finite output")]
    NonFinite,
    #[error("model produced probability {0} outside [0, 1]")]
    InvalidProbability(f64),
    #[error("model rejected input: {0}")]
    Model(String),
}

/// Failure of a single prediction request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error(transparent)]
    Features(#[from] FeatureError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

impl RequestError {
    /// Stable machine-readable tag used in error responses and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            RequestError::Features(FeatureError::SchemaMismatch { .. }) => "schema_mismatch",
            RequestError::Features(_) => "invalid_value",
            RequestError::Prediction(PredictionError::Transform(_)) => "transform_failed",
            RequestError::Prediction(_) => "prediction_failed",
        }
    }

    /// True when the caller supplied bad input, false when the artifacts failed.
    pub fn is_rejection(&self) -> bool {
        matches!(self, RequestError::Features(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        let mismatch = RequestError::from(FeatureError::SchemaMismatch { missing: vec!["a".into()], unexpected: vec![] });
        assert_eq!(mismatch.kind(), "schema_mismatch");
        assert!(mismatch.is_rejection());
        let invalid = RequestError::from(FeatureError::InvalidValue { feature: "sex".into(), reason: "code 2".into() });
        assert_eq!(invalid.kind(), "invalid_value");
        let transform = RequestError::from(PredictionError::from(TransformError::Shape { expected: 3, found: 2 }));
        assert_eq!(transform.kind(), "transform_failed");
        assert!(!transform.is_rejection());
        assert_eq!(RequestError::from(PredictionError::NonFinite).kind(), "prediction_failed");
    }

    #[test]
    fn messages_name_the_feature() {
        let err = FeatureError::InvalidValue { feature: "age".into(), reason: "121 above maximum 90".into() };
        assert_eq!(err.to_string(), "invalid value for age: 121 above maximum 90");
    }
}
