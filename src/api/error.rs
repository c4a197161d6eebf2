//! API error type with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::artifacts::ArtifactError;
use crate::assistant::AssistantError;
use crate::imaging::InputError;
use crate::normalize::ValidationError;
use crate::predict::PredictError;
use crate::upstream::UpstreamError;

/// Error response body: `{"error": "...", "code": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    UnsupportedMediaType(String),
    #[error("Artifact unavailable: {0}")]
    ArtifactUnavailable(ArtifactError),
    #[error("Upstream service failed: {0}")]
    Upstream(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Input(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::ArtifactUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Input(_) => "INPUT_ERROR",
            ApiError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            ApiError::ArtifactUnavailable(_) => "ARTIFACT_UNAVAILABLE",
            ApiError::Upstream(_) => "UPSTREAM_ERROR",
            ApiError::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            ApiError::Validation(msg) | ApiError::Input(msg) | ApiError::UnsupportedMediaType(msg) => {
                tracing::warn!(status = status.as_u16(), code, error = %msg, "Request rejected");
                msg.clone()
            }
            ApiError::ArtifactUnavailable(err) => {
                tracing::error!(error = %err, "Model artifact unavailable");
                match err.artifact_name() {
                    Some(name) => format!("Model artifact '{name}' is not available"),
                    None => "Model artifacts are not available".to_string(),
                }
            }
            ApiError::Upstream(detail) => {
                tracing::error!(detail = %detail, "Upstream service failed");
                detail.clone()
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                "An internal error occurred".to_string()
            }
        };

        (status, Json(ErrorBody { error: message, code })).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        ApiError::Input(err.to_string())
    }
}

impl From<ArtifactError> for ApiError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::LockPoisoned => ApiError::Internal(err.to_string()),
            other => ApiError::ArtifactUnavailable(other),
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Client(detail) => ApiError::Internal(detail),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Validation(e) => e.into(),
            PredictError::Input(e) => e.into(),
            PredictError::Artifact(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::EmptyInput
            | AssistantError::InvalidAudio(_)
            | AssistantError::EmptyTranscript => ApiError::Validation(err.to_string()),
            AssistantError::Upstream(e) => e.into(),
            AssistantError::Tips { .. } => ApiError::Internal(err.to_string()),
        }
    }
}
