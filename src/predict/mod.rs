//! Model invocation and result shaping.
//!
//! Every entry point validates and normalizes first, then touches the
//! model. Inference and image decoding run on the blocking pool.

pub mod response;

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::sync::Arc;

use thiserror::Error;

use crate::artifacts::registry::{
    CHEST_XRAY_MODEL, DISEASE_LABEL_ENCODER, DISEASE_MODEL, DISEASE_TOP_FEATURES,
    SKIN_LESION_MODEL,
};
use crate::artifacts::{ArtifactCache, ArtifactError, InputTensor, ModelError};
use crate::imaging::{self, InputError};
use crate::normalize::{
    self, symptom_vector, Domain, DomainSchema, NormalizeError, RawRequest, ValidationError,
};

pub use response::{
    clamp_unit, DiseaseScore, ImageDiagnosis, RiskAssessment, RiskLevel, POSITIVE_THRESHOLD,
};

/// Number of diseases returned by the symptom checker.
pub const TOP_K: usize = 3;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Model returned class {index} but the label encoder has {classes} classes")]
    UnknownClass { index: usize, classes: usize },

    #[error("Prediction task failed: {0}")]
    Task(String),
}

impl From<NormalizeError> for PredictError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::Validation(e) => PredictError::Validation(e),
            NormalizeError::Artifact(e) => PredictError::Artifact(e),
        }
    }
}

impl PredictError {
    /// Rejected client input, as opposed to a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictError::Validation(_) | PredictError::Input(_))
    }
}

/// The two image classifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    ChestXray,
    SkinLesion,
}

impl ScanKind {
    pub fn domain(self) -> Domain {
        match self {
            ScanKind::ChestXray => Domain::ChestXray,
            ScanKind::SkinLesion => Domain::SkinLesion,
        }
    }

    pub fn model(self) -> &'static str {
        match self {
            ScanKind::ChestXray => CHEST_XRAY_MODEL,
            ScanKind::SkinLesion => SKIN_LESION_MODEL,
        }
    }

    /// Label for a positive-class score.
    pub fn label(self, score: f32) -> &'static str {
        let positive = score > POSITIVE_THRESHOLD;
        match (self, positive) {
            (ScanKind::ChestXray, true) => "Pneumonia",
            (ScanKind::ChestXray, false) => "Normal",
            (ScanKind::SkinLesion, true) => "Melanoma",
            (ScanKind::SkinLesion, false) => "Benign",
        }
    }
}

/// Indices and scores of the `k` highest scores, descending. NaN sorts last.
pub fn rank_top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal),
    });
    ranked.truncate(k);
    ranked
}

/// Positive-class score of a single-output sigmoid model.
fn positive_score(scores: &[f32]) -> Result<f32, ModelError> {
    let score = scores.first().copied().ok_or(ModelError::EmptyOutput)?;
    if !score.is_finite() {
        return Err(ModelError::Inference(format!("non-finite score {score}")));
    }
    Ok(clamp_unit(score))
}

pub fn assess_risk(
    artifacts: &ArtifactCache,
    schema: &DomainSchema,
    raw: &RawRequest,
) -> Result<RiskAssessment, PredictError> {
    let features = normalize::normalize(schema, raw, artifacts)?;
    tracing::debug!(domain = %schema.domain, features = ?features.values, "Feature vector assembled");

    let model = artifacts.model(schema.model)?;
    let scores = model.score(&InputTensor::row(features.values))?;
    Ok(RiskAssessment::from_score(positive_score(&scores)?))
}

pub fn rank_diseases(
    artifacts: &ArtifactCache,
    symptoms: &[String],
) -> Result<Vec<DiseaseScore>, PredictError> {
    let top_features = artifacts.feature_list(DISEASE_TOP_FEATURES)?;
    let encoder = artifacts.encoder(DISEASE_LABEL_ENCODER)?;
    let model = artifacts.model(DISEASE_MODEL)?;

    let features = symptom_vector(symptoms, &top_features);
    let scores = model.score(&InputTensor::row(features.values))?;
    if scores.is_empty() {
        return Err(ModelError::EmptyOutput.into());
    }

    rank_top_k(&scores, TOP_K)
        .into_iter()
        .map(|(index, score)| {
            let disease = encoder.decode(index).ok_or(PredictError::UnknownClass {
                index,
                classes: encoder.classes.len(),
            })?;
            Ok(DiseaseScore {
                disease,
                confidence: clamp_unit(score),
            })
        })
        .collect()
}

pub fn diagnose_image(
    artifacts: &ArtifactCache,
    scan: ScanKind,
    bytes: &[u8],
) -> Result<ImageDiagnosis, PredictError> {
    let tensor = imaging::preprocess(bytes)?;
    let model = artifacts.model(scan.model())?;
    let score = positive_score(&model.score(&tensor)?)?;
    Ok(ImageDiagnosis {
        disease: scan.label(score).to_string(),
        confidence: score,
    })
}

/// Async front for the prediction functions, shared by the HTTP handlers.
#[derive(Clone)]
pub struct Predictor {
    artifacts: Arc<ArtifactCache>,
}

impl Predictor {
    pub fn new(artifacts: Arc<ArtifactCache>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &ArtifactCache {
        &self.artifacts
    }

    pub async fn assess(
        &self,
        schema: &'static DomainSchema,
        raw: RawRequest,
    ) -> Result<RiskAssessment, PredictError> {
        let input = raw.to_string();
        let artifacts = Arc::clone(&self.artifacts);
        let result = run_blocking(move || assess_risk(&artifacts, schema, &raw)).await;
        log_outcome(schema.domain, &input, &result);
        result
    }

    pub async fn rank_diseases(
        &self,
        symptoms: Vec<String>,
    ) -> Result<Vec<DiseaseScore>, PredictError> {
        let input = format!("{symptoms:?}");
        let artifacts = Arc::clone(&self.artifacts);
        let result = run_blocking(move || rank_diseases(&artifacts, &symptoms)).await;
        log_outcome(Domain::Disease, &input, &result);
        result
    }

    pub async fn diagnose_image(
        &self,
        scan: ScanKind,
        bytes: Vec<u8>,
    ) -> Result<ImageDiagnosis, PredictError> {
        let input = format!("{} byte upload", bytes.len());
        let artifacts = Arc::clone(&self.artifacts);
        let result = run_blocking(move || diagnose_image(&artifacts, scan, &bytes)).await;
        log_outcome(scan.domain(), &input, &result);
        result
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, PredictError>
where
    F: FnOnce() -> Result<T, PredictError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| PredictError::Task(e.to_string()))?
}

fn log_outcome<T: Debug>(domain: Domain, input: &dyn Display, result: &Result<T, PredictError>) {
    match result {
        Ok(value) => tracing::info!(domain = %domain, result = ?value, "Prediction complete"),
        Err(e) if e.is_client_error() => {
            tracing::warn!(domain = %domain, input = %input, error = %e, "Prediction rejected")
        }
        Err(e) => tracing::error!(domain = %domain, input = %input, error = %e, "Prediction failed"),
    }
}
