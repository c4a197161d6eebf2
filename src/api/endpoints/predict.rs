//! Prediction endpoints: symptom checker, tabular risk models, image scans.

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::extract::{preview, JsonBody, SymptomForm, UploadedFile};
use crate::api::types::ApiContext;
use crate::normalize::schema::{DIABETES, HEART_DISEASE, MENTAL_HEALTH};
use crate::normalize::{DomainSchema, RawRequest};
use crate::predict::{DiseaseScore, ImageDiagnosis, RiskAssessment, ScanKind};

/// `POST /predict/disease` — top three diseases for the submitted symptoms.
pub async fn disease(
    State(ctx): State<ApiContext>,
    SymptomForm(symptoms): SymptomForm,
) -> Result<Json<Vec<DiseaseScore>>, ApiError> {
    Ok(Json(ctx.predictor.rank_diseases(symptoms).await?))
}

async fn assess(
    ctx: &ApiContext,
    schema: &'static DomainSchema,
    body: Value,
) -> Result<Json<RiskAssessment>, ApiError> {
    let input = body.to_string();
    let raw = RawRequest::from_json(body).map_err(|e| {
        tracing::warn!(
            domain = %schema.domain,
            input = %preview(&input),
            error = %e,
            "Prediction rejected"
        );
        e
    })?;
    Ok(Json(ctx.predictor.assess(schema, raw).await?))
}

/// `POST /predict/diabetes`
pub async fn diabetes(
    State(ctx): State<ApiContext>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<RiskAssessment>, ApiError> {
    assess(&ctx, &DIABETES, body).await
}

/// `POST /predict/heart_disease`
pub async fn heart_disease(
    State(ctx): State<ApiContext>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<RiskAssessment>, ApiError> {
    assess(&ctx, &HEART_DISEASE, body).await
}

/// `POST /predict/mental_health`
pub async fn mental_health(
    State(ctx): State<ApiContext>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<RiskAssessment>, ApiError> {
    assess(&ctx, &MENTAL_HEALTH, body).await
}

/// `POST /predict/chest_xray` — Pneumonia / Normal.
pub async fn chest_xray(
    State(ctx): State<ApiContext>,
    upload: UploadedFile,
) -> Result<Json<ImageDiagnosis>, ApiError> {
    scan(&ctx, ScanKind::ChestXray, upload).await
}

/// `POST /predict/cancer` — Melanoma / Benign.
pub async fn cancer(
    State(ctx): State<ApiContext>,
    upload: UploadedFile,
) -> Result<Json<ImageDiagnosis>, ApiError> {
    scan(&ctx, ScanKind::SkinLesion, upload).await
}

async fn scan(
    ctx: &ApiContext,
    kind: ScanKind,
    upload: UploadedFile,
) -> Result<Json<ImageDiagnosis>, ApiError> {
    tracing::debug!(
        domain = %kind.domain(),
        file = upload.file_name.as_deref().unwrap_or("-"),
        bytes = upload.bytes.len(),
        "Scan received"
    );
    Ok(Json(ctx.predictor.diagnose_image(kind, upload.bytes).await?))
}
