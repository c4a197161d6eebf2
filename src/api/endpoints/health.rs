//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub artifacts_dir: String,
    pub loaded_artifacts: Vec<&'static str>,
    pub started_at: String,
}

/// `GET /health` — liveness plus which artifacts are resident.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        artifacts_dir: ctx.artifacts().dir().display().to_string(),
        loaded_artifacts: ctx.artifacts().loaded(),
        started_at: ctx.started_at.to_string(),
    })
}
