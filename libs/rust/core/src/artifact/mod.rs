//! Pre-fitted artifacts: models, transforms and their descriptive metadata.
//!
//! Artifacts are JSON documents tagged by `kind`. They are deserialized and
//! validated once by [`ArtifactStore::load`] and never mutated afterwards.

pub mod forest;
pub mod linear;
pub mod logistic;
pub mod scaler;
pub mod store;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::PredictionError;

pub use forest::{RandomForest, Tree, TreeNode};
pub use linear::LinearRegression;
pub use logistic::LogisticRegression;
pub use scaler::StandardScaler;
pub use store::{ArtifactDigests, ArtifactLocations, ArtifactStore};

/// Class label emitted by classifiers.
pub type Label = i64;

/// Free-form descriptive metadata (model type, training parameters, ...).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    Regression,
    Classification,
}

/// A fitted model producing one scalar estimate per row.
pub trait Regressor {
    fn predict(&self, x: &[f64]) -> Result<f64, PredictionError>;
}

/// A fitted model producing a label and per-class probabilities per row.
pub trait Classifier {
    fn classes(&self) -> &[Label];

    /// Index into [`Classifier::classes`] of the class whose probability is reported.
    fn positive_index(&self) -> usize;

    /// Probabilities aligned with [`Classifier::classes`].
    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, PredictionError>;

    fn predict(&self, x: &[f64]) -> Result<Label, PredictionError> {
        let proba = self.predict_proba(x)?;
        let best = argmax(&proba).ok_or(PredictionError::NonFinite)?;
        Ok(self.classes()[best])
    }

    fn predict_probability(&self, x: &[f64]) -> Result<f64, PredictionError> {
        let proba = self.predict_proba(x)?;
        Ok(proba[self.positive_index()])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LinearRegression(LinearRegression),
    RandomForestClassifier(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl ModelArtifact {
    pub fn task(&self) -> Task {
        match self {
            ModelArtifact::LinearRegression(_) => Task::Regression,
            ModelArtifact::RandomForestClassifier(_) | ModelArtifact::LogisticRegression(_) => Task::Classification,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::LinearRegression(_) => "linear_regression",
            ModelArtifact::RandomForestClassifier(_) => "random_forest_classifier",
            ModelArtifact::LogisticRegression(_) => "logistic_regression",
        }
    }

    pub fn feature_names(&self) -> &[String] {
        match self {
            ModelArtifact::LinearRegression(m) => &m.feature_names,
            ModelArtifact::RandomForestClassifier(m) => &m.feature_names,
            ModelArtifact::LogisticRegression(m) => &m.feature_names,
        }
    }

    pub fn as_regressor(&self) -> Option<&dyn Regressor> {
        match self {
            ModelArtifact::LinearRegression(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_classifier(&self) -> Option<&dyn Classifier> {
        match self {
            ModelArtifact::RandomForestClassifier(m) => Some(m),
            ModelArtifact::LogisticRegression(m) => Some(m),
            ModelArtifact::LinearRegression(_) => None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            ModelArtifact::LinearRegression(m) => m.validate(),
            ModelArtifact::RandomForestClassifier(m) => m.validate(),
            ModelArtifact::LogisticRegression(m) => m.validate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformArtifact {
    StandardScaler(StandardScaler),
}

impl TransformArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            TransformArtifact::StandardScaler(_) => "standard_scaler",
        }
    }

    pub fn feature_names(&self) -> &[String] {
        match self {
            TransformArtifact::StandardScaler(s) => &s.feature_names,
        }
    }

    pub fn transform(&self, features: &crate::FeatureVector) -> Result<crate::FeatureVector, crate::error::TransformError> {
        match self {
            TransformArtifact::StandardScaler(s) => s.transform(features),
        }
    }

    pub fn inverse_transform(&self, features: &crate::FeatureVector) -> Result<crate::FeatureVector, crate::error::TransformError> {
        match self {
            TransformArtifact::StandardScaler(s) => s.inverse_transform(features),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            TransformArtifact::StandardScaler(s) => s.validate(),
        }
    }
}

pub(crate) fn check_feature_names(names: &[String]) -> Result<(), String> {
    if names.is_empty() {
        return Err("feature_names is empty".into());
    }
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(format!("duplicate feature name {name}"));
        }
    }
    Ok(())
}

pub(crate) fn check_finite(field: &str, values: &[f64]) -> Result<(), String> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(format!("{field}[{i}] is not finite")),
        None => Ok(()),
    }
}

pub(crate) fn check_classes(classes: &[Label], positive_class: Option<Label>) -> Result<(), String> {
    if classes.is_empty() {
        return Err("classes is empty".into());
    }
    let unique: HashSet<_> = classes.iter().collect();
    if unique.len() != classes.len() {
        return Err("classes contains duplicates".into());
    }
    if let Some(positive) = positive_class {
        if !classes.contains(&positive) {
            return Err(format!("positive_class {positive} is not one of {classes:?}"));
        }
    }
    Ok(())
}

pub(crate) fn positive_index(classes: &[Label], positive_class: Option<Label>) -> usize {
    positive_class
        .and_then(|p| classes.iter().position(|c| *c == p))
        .unwrap_or(classes.len().saturating_sub(1))
}

pub(crate) fn check_width(expected: usize, x: &[f64]) -> Result<(), PredictionError> {
    if x.len() == expected {
        Ok(())
    } else {
        Err(PredictionError::Model(format!("expected {expected} features, got {}", x.len())))
    }
}

/// Index of the largest value; the first one wins ties.
fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.iter().copied().enumerate() {
        if !v.is_finite() {
            return None;
        }
        if best.map_or(true, |(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}
