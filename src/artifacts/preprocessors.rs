//! Fitted preprocessors stored as JSON next to the models.
//!
//! Scalers and label encoders are exported from the training notebooks as
//! plain parameter dumps, so loading them needs nothing beyond serde.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Standard scaler: `(x - mean) / scale` per column.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    /// Column names the scaler was fit on, in order. May be empty for
    /// scalers fit on bare arrays.
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Check internal consistency after deserialization.
    pub fn validate(&self) -> Result<(), String> {
        if self.mean.is_empty() {
            return Err("scaler has no columns".into());
        }
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "mean has {} values but scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if !self.feature_names.is_empty() && self.feature_names.len() != self.mean.len() {
            return Err(format!(
                "{} feature names for {} columns",
                self.feature_names.len(),
                self.mean.len()
            ));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err("scaler parameters must be finite".into());
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Scale `values` in place. `columns` names the values, in order, and
    /// must match the columns the scaler was fit on.
    pub fn transform(&self, columns: &[&str], values: &mut [f64]) -> Result<(), String> {
        if columns.len() != values.len() || values.len() != self.n_features() {
            return Err(format!(
                "scaler expects {} columns, got {}",
                self.n_features(),
                values.len()
            ));
        }
        if !self.feature_names.is_empty() && !self.feature_names.iter().eq(columns.iter()) {
            return Err(format!(
                "scaler was fit on {:?}, asked to transform {:?}",
                self.feature_names, columns
            ));
        }
        for ((value, mean), scale) in values.iter_mut().zip(&self.mean).zip(&self.scale) {
            // sklearn stores 1.0 for zero-variance columns; treat 0 the same way.
            let scale = if *scale == 0.0 { 1.0 } else { *scale };
            *value = (*value - mean) / scale;
        }
        Ok(())
    }
}

/// One class of a label encoder. Encoders are fit either on strings
/// (`"Moderate"`) or on numbers (`1.0` for chest pain type).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassLabel::Number(n) if n.fract() == 0.0 => write!(f, "{n:.1}"),
            ClassLabel::Number(n) => write!(f, "{n}"),
            ClassLabel::Text(s) => f.write_str(s),
        }
    }
}

/// Label encoder: a class is encoded as its index in `classes`.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<ClassLabel>,
}

impl LabelEncoder {
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err("label encoder has no classes".into());
        }
        Ok(())
    }

    pub fn encode_text(&self, value: &str) -> Option<usize> {
        self.classes
            .iter()
            .position(|c| matches!(c, ClassLabel::Text(s) if s == value))
    }

    pub fn encode_number(&self, value: f64) -> Option<usize> {
        self.classes
            .iter()
            .position(|c| matches!(c, ClassLabel::Number(n) if *n == value))
    }

    /// Class label for an encoded index.
    pub fn decode(&self, index: usize) -> Option<String> {
        self.classes.get(index).map(|c| c.to_string())
    }

    /// Human-readable list of accepted values, for error messages.
    pub fn allowed(&self) -> Vec<String> {
        self.classes.iter().map(|c| c.to_string()).collect()
    }
}

/// Several encoders stored in one file, keyed by short name
/// (`sleep`, `mood`, `social`).
pub type EncoderSet = BTreeMap<String, LabelEncoder>;
