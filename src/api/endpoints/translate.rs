//! Translation endpoint. Currently an identity pass-through kept for the
//! frontend's language switcher.

use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::extract::{preview, JsonBody};

#[derive(Serialize)]
pub struct TranslateResponse {
    pub translated_text: String,
}

/// `POST /translate` — body `{text, target_lang}`.
pub async fn translate(
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let empty = match &body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
    };
    if empty {
        tracing::warn!(body = %body, "Translation rejected: empty body");
        return Err(ApiError::Validation("No JSON data provided".into()));
    }

    let text = body
        .get("text")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            tracing::warn!(body = %preview(&body.to_string()), "Translation rejected: no text");
            ApiError::Validation("Missing text field".into())
        })?;
    let target_lang = body
        .get("target_lang")
        .and_then(Value::as_str)
        .unwrap_or("en");

    let preview: String = text.chars().take(50).collect();
    tracing::info!(target_lang, text = %preview, "Translation served");

    Ok(Json(TranslateResponse {
        translated_text: text.to_string(),
    }))
}
