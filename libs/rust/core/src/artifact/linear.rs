//! Linear regression (ordinary, ridge, lasso all share this fitted form).

use serde::{Deserialize, Serialize};

use super::{check_feature_names, check_finite, check_width, Regressor};
use crate::error::PredictionError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegression {
    pub(crate) fn validate(&self) -> Result<(), String> {
        check_feature_names(&self.feature_names)?;
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

impl Regressor for LinearRegression {
    fn predict(&self, x: &[f64]) -> Result<f64, PredictionError> {
        check_width(self.coefficients.len(), x)?;
        let y = self.coefficients.iter().zip(x).fold(self.intercept, |acc, (w, v)| acc + w * v);
        Ok(y)
    }
}
