//! Standard scaler: `(x - mean) / scale` per feature.

use serde::{Deserialize, Serialize};

use super::{check_feature_names, check_finite};
use crate::error::TransformError;
use crate::features::FeatureVector;

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default = "enabled")]
    pub with_mean: bool,
    #[serde(default = "enabled")]
    pub with_std: bool,
}

impl StandardScaler {
    pub(crate) fn validate(&self) -> Result<(), String> {
        check_feature_names(&self.feature_names)?;
        let n = self.feature_names.len();
        if self.mean.len() != n || self.scale.len() != n {
            return Err(format!("{} means and {} scales for {n} features", self.mean.len(), self.scale.len()));
        }
        check_finite("mean", &self.mean)?;
        check_finite("scale", &self.scale)?;
        if let Some(i) = self.scale.iter().position(|s| *s == 0.0) {
            return Err(format!("scale[{i}] is zero"));
        }
        Ok(())
    }

    pub fn transform(&self, features: &FeatureVector) -> Result<FeatureVector, TransformError> {
        self.apply(features, |x, mean, scale| (x - mean) / scale)
    }

    pub fn inverse_transform(&self, features: &FeatureVector) -> Result<FeatureVector, TransformError> {
        self.apply(features, |x, mean, scale| x * scale + mean)
    }

    fn apply(&self, features: &FeatureVector, f: impl Fn(f64, f64, f64) -> f64) -> Result<FeatureVector, TransformError> {
        let x = features.as_ordered_sequence();
        if x.len() != self.mean.len() {
            return Err(TransformError::Shape { expected: self.mean.len(), found: x.len() });
        }
        let mut out = Vec::with_capacity(x.len());
        for (i, v) in x.iter().enumerate() {
            let mean = if self.with_mean { self.mean[i] } else { 0.0 };
            let scale = if self.with_std { self.scale[i] } else { 1.0 };
            let y = f(*v, mean, scale);
            if !y.is_finite() {
                return Err(TransformError::NonFinite { feature: self.feature_names[i].clone() });
            }
            out.push(y);
        }
        Ok(features.rescaled(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureInputs, FeatureSchema, FeatureSlot};
    use serde_json::json;

    fn scaler() -> StandardScaler {
        StandardScaler {
            feature_names: vec!["a".into(), "b".into()],
            mean: vec![10.0, -2.0],
            scale: vec![4.0, 0.5],
            with_mean: true,
            with_std: true,
        }
    }

    fn vector(a: f64, b: f64) -> FeatureVector {
        let schema = FeatureSchema::new(vec![FeatureSlot::continuous("a"), FeatureSlot::continuous("b")]).unwrap();
        let inputs: FeatureInputs = serde_json::from_value(json!({"a": a, "b": b})).unwrap();
        FeatureVector::build(&schema, &inputs).unwrap()
    }

    #[test]
    fn standardises_each_feature() {
        let out = scaler().transform(&vector(18.0, -1.0)).unwrap();
        assert_eq!(out.as_ordered_sequence(), &[2.0, 2.0]);
        assert_eq!(out.schema(), vector(0.0, 0.0).schema());
    }

    #[test]
    fn inverse_restores_original_within_tolerance() {
        let s = scaler();
        let original = vector(213.7, 0.123);
        let restored = s.inverse_transform(&s.transform(&original).unwrap()).unwrap();
        for (a, b) in original.as_ordered_sequence().iter().zip(restored.as_ordered_sequence()) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn switches_disable_centering_and_scaling() {
        let mut s = scaler();
        s.with_mean = false;
        assert_eq!(s.transform(&vector(8.0, 1.0)).unwrap().as_ordered_sequence(), &[2.0, 2.0]);
        s.with_std = false;
        assert_eq!(s.transform(&vector(8.0, 1.0)).unwrap().as_ordered_sequence(), &[8.0, 1.0]);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let mut s = scaler();
        s.mean.push(0.0);
        s.scale.push(1.0);
        s.feature_names.push("c".into());
        assert_eq!(s.transform(&vector(1.0, 1.0)).unwrap_err(), TransformError::Shape { expected: 3, found: 2 });
    }

    #[test]
    fn zero_scale_is_invalid() {
        let mut s = scaler();
        s.scale[1] = 0.0;
        assert_eq!(s.validate().unwrap_err(), "scale[1] is zero");
    }

    #[test]
    fn optional_switches_default_on() {
        let raw = r#"{"feature_names":["a"],"mean":[1.0],"scale":[2.0]}"#;
        let s: StandardScaler = serde_json::from_str(raw).unwrap();
        assert!(s.with_mean && s.with_std);
    }
}
