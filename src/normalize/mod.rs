//! Request → feature vector normalization.
//!
//! Client input arrives loosely typed (JSON numbers or strings, form keys).
//! Each prediction domain declares a [`DomainSchema`]; a single normalizer
//! validates the request against it and assembles the vector in the exact
//! column order the model was fit with.

pub mod schema;
pub mod symptoms;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::artifacts::ArtifactError;

pub use schema::{normalize, Column, DomainSchema, EncoderRef, Source};
pub use symptoms::{canonical_symptom, symptom_vector};

/// Prediction domain, used for routing and log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Disease,
    Diabetes,
    HeartDisease,
    MentalHealth,
    ChestXray,
    SkinLesion,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Disease => "disease",
            Domain::Diabetes => "diabetes",
            Domain::HeartDisease => "heart_disease",
            Domain::MentalHealth => "mental_health",
            Domain::ChestXray => "chest_xray",
            Domain::SkinLesion => "skin_lesion",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client input rejected before any model is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required fields: {}", format_list(.0))]
    MissingFields(Vec<String>),

    #[error("Invalid numeric input for {field}: {value}")]
    InvalidNumber { field: String, value: String },

    #[error("Invalid {field} value: {value}. Valid values: {}", format_list(.allowed))]
    InvalidCategory {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Invalid encoded {field} value: {value}. Valid values: {}", format_list(.allowed))]
    UnencodedCategory {
        field: String,
        value: String,
        allowed: Vec<String>,
    },
}

/// `['a', 'b']`, the list format the frontend already displays.
fn format_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| format!("'{i}'")).collect();
    format!("[{}]", quoted.join(", "))
}

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Ordered numeric input for one model, with the column names it was
/// assembled from.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub columns: Vec<String>,
    pub values: Vec<f32>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Field map for one prediction request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRequest {
    fields: Map<String, Value>,
}

impl RawRequest {
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(ValidationError::NotAnObject),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Required fields absent from the request, in schema order.
    pub fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|f| !self.contains(f))
            .map(|f| f.to_string())
            .collect()
    }

    /// Numeric value of `field`. Missing fields are reported as missing.
    pub fn number(&self, field: &str) -> Result<f64, ValidationError> {
        match self.get(field) {
            Some(value) => coerce_number(field, value),
            None => Err(ValidationError::MissingFields(vec![field.to_string()])),
        }
    }
}

impl std::fmt::Display for RawRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Value::Object(self.fields.clone()))
    }
}

/// Coerce a JSON value to a finite `f64`. Accepts numbers, numeric strings
/// and booleans.
pub fn coerce_number(field: &str, value: &Value) -> Result<f64, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ValidationError::InvalidNumber {
            field: field.to_string(),
            value: display_value(value),
        }),
    }
}

/// Render a raw value for an error message: strings bare, the rest as JSON.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_message_lists_names() {
        let err = ValidationError::MissingFields(vec!["age".into(), "bmi".into()]);
        assert_eq!(err.to_string(), "Missing required fields: ['age', 'bmi']");
    }

    #[test]
    fn invalid_category_message_names_value_and_allowed_set() {
        let err = ValidationError::InvalidCategory {
            field: "chest_pain".into(),
            value: "Sharp".into(),
            allowed: vec!["Typical Angina".into(), "Asymptomatic".into()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid chest_pain value: Sharp. Valid values: ['Typical Angina', 'Asymptomatic']"
        );
    }

    #[test]
    fn raw_request_requires_object() {
        assert!(RawRequest::from_json(json!({"age": 3})).is_ok());
        assert_eq!(
            RawRequest::from_json(json!([1, 2])),
            Err(ValidationError::NotAnObject)
        );
        assert_eq!(RawRequest::from_json(Value::Null), Err(ValidationError::NotAnObject));
    }

    #[test]
    fn missing_preserves_schema_order() {
        let raw = RawRequest::from_json(json!({"bmi": 20})).unwrap();
        assert_eq!(raw.missing(&["age", "bmi", "glucose"]), vec!["age", "glucose"]);
    }

    #[test]
    fn coerce_accepts_numbers_strings_and_bools() {
        assert_eq!(coerce_number("age", &json!(42)).unwrap(), 42.0);
        assert_eq!(coerce_number("age", &json!(" 42.5 ")).unwrap(), 42.5);
        assert_eq!(coerce_number("smoking", &json!(true)).unwrap(), 1.0);
    }

    #[test]
    fn coerce_rejects_garbage_and_non_finite() {
        for value in [json!("forty"), json!(null), json!([1]), json!("NaN"), json!("inf")] {
            let err = coerce_number("age", &value).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidNumber { .. }), "{value}");
        }
    }

    #[test]
    fn number_reports_absent_field_as_missing() {
        let raw = RawRequest::from_json(json!({})).unwrap();
        assert_eq!(
            raw.number("lat"),
            Err(ValidationError::MissingFields(vec!["lat".into()]))
        );
    }
}
