//! Binary logistic regression.

use serde::{Deserialize, Serialize};

use super::{check_classes, check_feature_names, check_finite, check_width, positive_index, Classifier, Label};
use crate::error::PredictionError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub feature_names: Vec<String>,
    /// Exactly two labels; the decision function scores `classes[1]`.
    pub classes: Vec<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive_class: Option<Label>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    pub(crate) fn validate(&self) -> Result<(), String> {
        check_feature_names(&self.feature_names)?;
        check_classes(&self.classes, self.positive_class)?;
        if self.classes.len() != 2 {
            return Err(format!("binary model needs 2 classes, got {}", self.classes.len()));
        }
        if self.coefficients.len() != self.feature_names.len() {
            return Err(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.feature_names.len()
            ));
        }
        check_finite("coefficients", &self.coefficients)?;
        check_finite("intercept", &[self.intercept])
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticRegression {
    fn classes(&self) -> &[Label] {
        &self.classes
    }

    fn positive_index(&self) -> usize {
        positive_index(&self.classes, self.positive_class)
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, PredictionError> {
        check_width(self.coefficients.len(), x)?;
        let z = self.coefficients.iter().zip(x).fold(self.intercept, |acc, (w, v)| acc + w * v);
        let p = sigmoid(z);
        Ok(vec![1.0 - p, p])
    }
}
