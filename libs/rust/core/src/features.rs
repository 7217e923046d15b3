//! Feature schemas and validated feature vectors.
//!
//! A [`FeatureSchema`] is fixed at deployment time and must match the names
//! and order the artifacts were fitted against. A [`FeatureVector`] can only
//! be obtained through [`FeatureVector::build`], so holding one means every
//! slot is populated, in order, with a value its slot accepts.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::error::FeatureError;

/// Raw caller-supplied values keyed by feature name.
pub type FeatureInputs = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCode {
    pub code: i64,
    pub label: String,
}

/// Semantic type and valid range of a slot. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureKind {
    Continuous { min: Option<f64>, max: Option<f64> },
    Integer { min: i64, max: i64 },
    Categorical { codes: Vec<CategoryCode> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSlot {
    pub name: String,
    #[serde(flatten)]
    pub kind: FeatureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<f64>,
}

impl FeatureSlot {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self::with_kind(name, FeatureKind::Continuous { min: None, max: None })
    }

    pub fn bounded(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self::with_kind(name, FeatureKind::Continuous { min: Some(min), max: Some(max) })
    }

    pub fn integer(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self::with_kind(name, FeatureKind::Integer { min, max })
    }

    pub fn categorical(name: impl Into<String>, codes: &[(i64, &str)]) -> Self {
        let codes = codes.iter().map(|(code, label)| CategoryCode { code: *code, label: (*label).to_string() }).collect();
        Self::with_kind(name, FeatureKind::Categorical { codes })
    }

    fn with_kind(name: impl Into<String>, kind: FeatureKind) -> Self {
        Self { name: name.into(), kind, description: None, default: None }
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn default_value(mut self, value: f64) -> Self {
        self.default = Some(value);
        self
    }

    /// Validate one raw value against this slot and return it as a scalar.
    pub fn check(&self, value: &Value) -> Result<f64, FeatureError> {
        let number = value
            .as_f64()
            .ok_or_else(|| self.invalid(format!("expected a number, got {}", json_type(value))))?;
        if !number.is_finite() {
            return Err(self.invalid("value is not finite"));
        }
        match &self.kind {
            FeatureKind::Continuous { min, max } => {
                if let Some(min) = min.filter(|min| number < *min) {
                    return Err(self.invalid(format!("{number} below minimum {min}")));
                }
                if let Some(max) = max.filter(|max| number > *max) {
                    return Err(self.invalid(format!("{number} above maximum {max}")));
                }
            }
            FeatureKind::Integer { min, max } => {
                if number.fract() != 0.0 {
                    return Err(self.invalid(format!("{number} is not an integer")));
                }
                if number < *min as f64 {
                    return Err(self.invalid(format!("{number} below minimum {min}")));
                }
                if number > *max as f64 {
                    return Err(self.invalid(format!("{number} above maximum {max}")));
                }
            }
            FeatureKind::Categorical { codes } => {
                if number.fract() != 0.0 || !codes.iter().any(|c| c.code as f64 == number) {
                    let allowed: Vec<i64> = codes.iter().map(|c| c.code).collect();
                    return Err(self.invalid(format!("{number} is not one of the codes {allowed:?}")));
                }
            }
        }
        Ok(number)
    }

    fn invalid(&self, reason: impl Into<String>) -> FeatureError {
        FeatureError::InvalidValue { feature: self.name.clone(), reason: reason.into() }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Ordered, uniquely named feature slots. Cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    slots: Arc<[FeatureSlot]>,
}

impl FeatureSchema {
    pub fn new(slots: Vec<FeatureSlot>) -> Result<Self, FeatureError> {
        let mut seen = HashSet::new();
        for slot in &slots {
            if !seen.insert(slot.name.as_str()) {
                return Err(FeatureError::DuplicateSlot(slot.name.clone()));
            }
        }
        Ok(Self { slots: slots.into() })
    }

    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }

    pub fn name_list(&self) -> Vec<String> {
        self.names().map(str::to_string).collect()
    }

    pub fn matches_names(&self, names: &[String]) -> bool {
        self.len() == names.len() && self.names().zip(names).all(|(a, b)| a == b)
    }

    /// Default inputs for every slot, if every slot declares a default.
    pub fn default_inputs(&self) -> Option<FeatureInputs> {
        self.slots
            .iter()
            .map(|s| s.default.map(|d| (s.name.clone(), Value::from(d))))
            .collect()
    }
}

/// One validated value per schema slot, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn build(schema: &FeatureSchema, values: &FeatureInputs) -> Result<Self, FeatureError> {
        let missing: Vec<String> = schema.names().filter(|n| !values.contains_key(*n)).map(str::to_string).collect();
        let known: HashSet<&str> = schema.names().collect();
        let unexpected: Vec<String> = values.keys().filter(|k| !known.contains(k.as_str())).cloned().collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(FeatureError::SchemaMismatch { missing, unexpected });
        }

        let ordered = schema
            .slots()
            .iter()
            .map(|slot| slot.check(&values[&slot.name]))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { schema: schema.clone(), values: ordered })
    }

    /// Values in schema order; artifacts consume them positionally.
    pub fn as_ordered_sequence(&self) -> &[f64] {
        &self.values
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.names().position(|n| n == name).map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.schema.names().zip(self.values.iter().copied())
    }

    /// Same schema, new values. Used for transform output, which is no longer
    /// in the slots' raw units and so skips range validation.
    pub(crate) fn rescaled(&self, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), self.values.len());
        Self { schema: self.schema.clone(), values }
    }
}
