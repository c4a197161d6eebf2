//! Fixed table of artifact names and the files they load from.

use serde::Serialize;

/// What a file deserializes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Model,
    Scaler,
    Encoder,
    EncoderSet,
    FeatureList,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Scaler => write!(f, "scaler"),
            Self::Encoder => write!(f, "label encoder"),
            Self::EncoderSet => write!(f, "label encoder set"),
            Self::FeatureList => write!(f, "feature list"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub name: &'static str,
    /// File name relative to the artifacts directory.
    pub file: &'static str,
    pub kind: ArtifactKind,
}

pub const DISEASE_MODEL: &str = "disease_model";
pub const DISEASE_LABEL_ENCODER: &str = "disease_label_encoder";
pub const DISEASE_TOP_FEATURES: &str = "disease_top_features";
pub const DIABETES_MODEL: &str = "diabetes_model";
pub const DIABETES_SCALER: &str = "diabetes_scaler";
pub const DIABETES_LABEL_ENCODER: &str = "diabetes_label_encoder";
pub const HEART_DISEASE_MODEL: &str = "heart_disease_model";
pub const HEART_DISEASE_SCALER: &str = "heart_disease_scaler";
pub const HEART_DISEASE_LABEL_ENCODER: &str = "heart_disease_label_encoder";
pub const MENTAL_HEALTH_MODEL: &str = "mental_health_model";
pub const MENTAL_HEALTH_SCALER: &str = "mental_health_scaler";
pub const MENTAL_HEALTH_LABEL_ENCODERS: &str = "mental_health_label_encoders";
pub const SKIN_LESION_MODEL: &str = "skin_lesion_model";
pub const CHEST_XRAY_MODEL: &str = "chest_xray_model";

const fn spec(name: &'static str, file: &'static str, kind: ArtifactKind) -> ArtifactSpec {
    ArtifactSpec { name, file, kind }
}

pub const REGISTRY: &[ArtifactSpec] = &[
    spec(DISEASE_MODEL, "xgb_model_streamlined.onnx", ArtifactKind::Model),
    spec(DISEASE_LABEL_ENCODER, "label_encoder.json", ArtifactKind::Encoder),
    spec(DISEASE_TOP_FEATURES, "top_features.json", ArtifactKind::FeatureList),
    spec(DIABETES_MODEL, "diabetes_best_model.onnx", ArtifactKind::Model),
    spec(DIABETES_SCALER, "diabetes_scaler.json", ArtifactKind::Scaler),
    spec(DIABETES_LABEL_ENCODER, "diabetes_label_encoder.json", ArtifactKind::Encoder),
    spec(HEART_DISEASE_MODEL, "heart_disease_best_model.onnx", ArtifactKind::Model),
    spec(HEART_DISEASE_SCALER, "heart_disease_scaler.json", ArtifactKind::Scaler),
    spec(HEART_DISEASE_LABEL_ENCODER, "heart_disease_label_encoder.json", ArtifactKind::Encoder),
    spec(MENTAL_HEALTH_MODEL, "mental_health_best_model.onnx", ArtifactKind::Model),
    spec(MENTAL_HEALTH_SCALER, "mental_health_scaler.json", ArtifactKind::Scaler),
    spec(
        MENTAL_HEALTH_LABEL_ENCODERS,
        "mental_health_label_encoders.json",
        ArtifactKind::EncoderSet,
    ),
    spec(SKIN_LESION_MODEL, "skin_lesion_inceptionv3_model.onnx", ArtifactKind::Model),
    spec(CHEST_XRAY_MODEL, "chest_xray_model.onnx", ArtifactKind::Model),
];

pub fn lookup(name: &str) -> Option<&'static ArtifactSpec> {
    REGISTRY.iter().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_and_files_are_unique() {
        let names: HashSet<_> = REGISTRY.iter().map(|s| s.name).collect();
        let files: HashSet<_> = REGISTRY.iter().map(|s| s.file).collect();
        assert_eq!(names.len(), REGISTRY.len());
        assert_eq!(files.len(), REGISTRY.len());
    }

    #[test]
    fn models_are_onnx_and_preprocessors_json() {
        for spec in REGISTRY {
            match spec.kind {
                ArtifactKind::Model => assert!(spec.file.ends_with(".onnx"), "{}", spec.name),
                _ => assert!(spec.file.ends_with(".json"), "{}", spec.name),
            }
        }
    }

    #[test]
    fn lookup_unknown_is_none() {
        assert!(lookup("nonexistent").is_none());
        assert_eq!(lookup(DIABETES_SCALER).unwrap().kind, ArtifactKind::Scaler);
    }
}
