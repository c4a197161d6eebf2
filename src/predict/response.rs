use serde::Serialize;

/// Binary decision boundary for every sigmoid-output model.
pub const POSITIVE_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    High,
    Low,
}

impl RiskLevel {
    pub fn from_score(score: f32) -> Self {
        if score > POSITIVE_THRESHOLD {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }
}

/// Tabular questionnaire result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk: RiskLevel,
    /// Raw positive-class score, not the confidence in `risk`.
    pub confidence: f32,
}

impl RiskAssessment {
    pub fn from_score(score: f32) -> Self {
        let confidence = clamp_unit(score);
        Self {
            risk: RiskLevel::from_score(confidence),
            confidence,
        }
    }
}

/// Image classifier result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageDiagnosis {
    pub disease: String,
    pub confidence: f32,
}

/// One entry of the ranked symptom-based result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseScore {
    pub disease: String,
    pub confidence: f32,
}

/// Clamp into [0, 1]. NaN passes through so callers can detect it.
pub fn clamp_unit(score: f32) -> f32 {
    if score.is_nan() {
        score
    } else {
        score.clamp(0.0, 1.0)
    }
}
