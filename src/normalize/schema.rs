//! Declarative per-domain schemas and the normalizer that applies them.

use crate::artifacts::registry::{
    DIABETES_LABEL_ENCODER, DIABETES_MODEL, DIABETES_SCALER, HEART_DISEASE_LABEL_ENCODER,
    HEART_DISEASE_MODEL, HEART_DISEASE_SCALER, MENTAL_HEALTH_LABEL_ENCODERS,
    MENTAL_HEALTH_MODEL, MENTAL_HEALTH_SCALER,
};
use crate::artifacts::{ArtifactCache, ArtifactError, ClassLabel, LabelEncoder};

use super::{display_value, Domain, FeatureVector, NormalizeError, RawRequest, ValidationError};

/// Where a categorical column's label encoder lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderRef {
    /// A standalone encoder artifact.
    Artifact(&'static str),
    /// One entry of an encoder-set artifact.
    Member {
        set: &'static str,
        key: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Source {
    /// Numeric field, optionally standardized by the domain scaler.
    Numeric { field: &'static str, scaled: bool },
    /// 1.0 when the numeric field is strictly above `cutoff`, else 0.0.
    Threshold { field: &'static str, cutoff: f64 },
    /// Categorical field, label encoded. With `remap`, the client string is
    /// first translated to the numeric class the encoder was fit on.
    Encoded {
        field: &'static str,
        encoder: EncoderRef,
        remap: Option<&'static [(&'static str, f64)]>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    /// Column name as seen by the scaler at fit time.
    pub name: &'static str,
    pub source: Source,
}

#[derive(Debug)]
pub struct DomainSchema {
    pub domain: Domain,
    pub required: &'static [&'static str],
    /// Fitted column order. Never reorder.
    pub columns: &'static [Column],
    pub scaler: &'static str,
    pub model: &'static str,
}

impl DomainSchema {
    pub fn scaled_columns(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| matches!(c.source, Source::Numeric { scaled: true, .. }))
            .map(|c| c.name)
            .collect()
    }
}

const fn numeric(name: &'static str, field: &'static str, scaled: bool) -> Column {
    Column {
        name,
        source: Source::Numeric { field, scaled },
    }
}

const fn threshold(name: &'static str, field: &'static str, cutoff: f64) -> Column {
    Column {
        name,
        source: Source::Threshold { field, cutoff },
    }
}

const fn encoded(
    name: &'static str,
    field: &'static str,
    encoder: EncoderRef,
    remap: Option<&'static [(&'static str, f64)]>,
) -> Column {
    Column {
        name,
        source: Source::Encoded {
            field,
            encoder,
            remap,
        },
    }
}

/// Diabetes family-history proxy: glucose above this (mg/dL).
pub const GLUCOSE_CUTOFF: f64 = 120.0;
/// Heart-disease family-history proxy: systolic pressure above this (mmHg).
pub const BLOOD_PRESSURE_CUTOFF: f64 = 140.0;

/// Chest pain type as labelled in the training data.
pub const CHEST_PAIN_TYPES: &[(&str, f64)] = &[
    ("Typical Angina", 1.0),
    ("Atypical Angina", 2.0),
    ("Non-anginal Pain", 3.0),
    ("Asymptomatic", 4.0),
];

pub static DIABETES: DomainSchema = DomainSchema {
    domain: Domain::Diabetes,
    required: &["age", "bmi", "skin_thickness", "glucose", "physical_activity"],
    columns: &[
        numeric("Age", "age", true),
        numeric("BMI", "bmi", true),
        numeric("SkinThickness", "skin_thickness", true),
        threshold("FamilyHistory", "glucose", GLUCOSE_CUTOFF),
        encoded(
            "PhysicalActivity",
            "physical_activity",
            EncoderRef::Artifact(DIABETES_LABEL_ENCODER),
            None,
        ),
    ],
    scaler: DIABETES_SCALER,
    model: DIABETES_MODEL,
};

pub static HEART_DISEASE: DomainSchema = DomainSchema {
    domain: Domain::HeartDisease,
    required: &["age", "blood_pressure", "smoking", "bmi", "chest_pain"],
    columns: &[
        numeric("Age", "age", true),
        numeric("BloodPressure", "blood_pressure", true),
        numeric("Smoking", "smoking", false),
        threshold("FamilyHistory", "blood_pressure", BLOOD_PRESSURE_CUTOFF),
        numeric("BMI", "bmi", true),
        encoded(
            "ChestPain",
            "chest_pain",
            EncoderRef::Artifact(HEART_DISEASE_LABEL_ENCODER),
            Some(CHEST_PAIN_TYPES),
        ),
    ],
    scaler: HEART_DISEASE_SCALER,
    model: HEART_DISEASE_MODEL,
};

pub static MENTAL_HEALTH: DomainSchema = DomainSchema {
    domain: Domain::MentalHealth,
    required: &[
        "age",
        "sleep_quality",
        "mood_frequency",
        "social_activity",
        "mental_health_history",
    ],
    columns: &[
        numeric("Age", "age", true),
        encoded(
            "SleepQuality",
            "sleep_quality",
            EncoderRef::Member {
                set: MENTAL_HEALTH_LABEL_ENCODERS,
                key: "sleep",
            },
            None,
        ),
        encoded(
            "MoodFrequency",
            "mood_frequency",
            EncoderRef::Member {
                set: MENTAL_HEALTH_LABEL_ENCODERS,
                key: "mood",
            },
            None,
        ),
        encoded(
            "SocialActivity",
            "social_activity",
            EncoderRef::Member {
                set: MENTAL_HEALTH_LABEL_ENCODERS,
                key: "social",
            },
            None,
        ),
        numeric("MentalHealthHistory", "mental_health_history", false),
    ],
    scaler: MENTAL_HEALTH_SCALER,
    model: MENTAL_HEALTH_MODEL,
};

/// Validate `raw` against `schema` and build the model's feature vector.
///
/// Order of checks: required fields, numeric coercion, categorical
/// encoding, then scaling of the continuous columns only.
pub fn normalize(
    schema: &DomainSchema,
    raw: &RawRequest,
    artifacts: &ArtifactCache,
) -> Result<FeatureVector, NormalizeError> {
    let missing = raw.missing(schema.required);
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing).into());
    }

    let mut values = vec![0.0f64; schema.columns.len()];

    for (slot, column) in values.iter_mut().zip(schema.columns) {
        match column.source {
            Source::Numeric { field, .. } => *slot = raw.number(field)?,
            Source::Threshold { field, cutoff } => {
                *slot = if raw.number(field)? > cutoff { 1.0 } else { 0.0 };
            }
            Source::Encoded { .. } => {}
        }
    }

    for (slot, column) in values.iter_mut().zip(schema.columns) {
        if let Source::Encoded {
            field,
            encoder,
            remap,
        } = column.source
        {
            *slot = encode(field, encoder, remap, raw, artifacts)? as f64;
        }
    }

    let scaled: Vec<usize> = schema
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c.source, Source::Numeric { scaled: true, .. }))
        .map(|(i, _)| i)
        .collect();

    if !scaled.is_empty() {
        let scaler = artifacts.scaler(schema.scaler)?;
        let names: Vec<&str> = scaled.iter().map(|&i| schema.columns[i].name).collect();
        let mut subset: Vec<f64> = scaled.iter().map(|&i| values[i]).collect();
        scaler
            .transform(&names, &mut subset)
            .map_err(|detail| ArtifactError::Corrupt {
                name: schema.scaler.to_string(),
                detail,
            })?;
        for (&i, v) in scaled.iter().zip(subset) {
            values[i] = v;
        }
    }

    Ok(FeatureVector {
        columns: schema.columns.iter().map(|c| c.name.to_string()).collect(),
        values: values.into_iter().map(|v| v as f32).collect(),
    })
}

fn encode(
    field: &str,
    encoder: EncoderRef,
    remap: Option<&'static [(&'static str, f64)]>,
    raw: &RawRequest,
    artifacts: &ArtifactCache,
) -> Result<usize, NormalizeError> {
    let value = raw
        .get(field)
        .ok_or_else(|| ValidationError::MissingFields(vec![field.to_string()]))?;
    let text = value.as_str();

    match remap {
        Some(table) => {
            let mapped = text
                .and_then(|t| table.iter().find(|(label, _)| *label == t))
                .map(|(_, class)| *class)
                .ok_or_else(|| ValidationError::InvalidCategory {
                    field: field.to_string(),
                    value: display_value(value),
                    allowed: table.iter().map(|(label, _)| label.to_string()).collect(),
                })?;
            let encoder = resolve_encoder(encoder, artifacts)?;
            encoder.encode_number(mapped).ok_or_else(|| {
                ValidationError::UnencodedCategory {
                    field: field.to_string(),
                    value: ClassLabel::Number(mapped).to_string(),
                    allowed: encoder.allowed(),
                }
                .into()
            })
        }
        None => {
            let encoder = resolve_encoder(encoder, artifacts)?;
            text.and_then(|t| encoder.encode_text(t)).ok_or_else(|| {
                ValidationError::InvalidCategory {
                    field: field.to_string(),
                    value: display_value(value),
                    allowed: encoder.allowed(),
                }
                .into()
            })
        }
    }
}

fn resolve_encoder(
    encoder: EncoderRef,
    artifacts: &ArtifactCache,
) -> Result<LabelEncoder, ArtifactError> {
    match encoder {
        EncoderRef::Artifact(name) => Ok(artifacts.encoder(name)?.as_ref().clone()),
        EncoderRef::Member { set, key } => artifacts
            .encoder_set(set)?
            .get(key)
            .cloned()
            .ok_or_else(|| ArtifactError::Corrupt {
                name: set.to_string(),
                detail: format!("no encoder named '{key}'"),
            }),
    }
}
