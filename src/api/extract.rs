//! Request extractors with HealthBot's error semantics.
//!
//! axum's stock `Json`, `Form` and `Multipart` rejections use their own
//! status codes and plain-text bodies; these wrappers map every failure
//! onto [`ApiError`].

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Form;
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;
use crate::imaging::{InputError, MAX_UPLOAD_BYTES, UPLOAD_FIELD};

/// Characters of a rejected body kept in log lines.
pub const PREVIEW_CHARS: usize = 200;

/// Start of `text` for a log line, marked when cut.
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// JSON body. The Content-Type must mention `application/json` (415
/// otherwise) and the body must not be empty.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let ct = content_type(req.headers());
        if !ct.to_ascii_lowercase().contains("application/json") {
            tracing::warn!(content_type = %ct, "JSON body expected");
            return Err(ApiError::UnsupportedMediaType(format!(
                "Unsupported Content-Type: {ct}. Expected 'application/json'"
            )));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Input(e.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ApiError::Validation("No JSON data provided".into()));
        }

        let body = String::from_utf8_lossy(&bytes);
        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(body = %preview(&body), error = %e, "Unparseable JSON body");
            ApiError::Validation(format!("Invalid JSON: {e}"))
        })?;
        let parsed = serde_json::from_value(value).map_err(|e| {
            tracing::warn!(body = %preview(&body), error = %e, "JSON body has the wrong shape");
            ApiError::Validation(format!("Invalid request body: {e}"))
        })?;
        Ok(JsonBody(parsed))
    }
}

/// The image uploaded in multipart field `file`.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[axum::async_trait]
impl<S> FromRequest<S> for UploadedFile
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // Anything that is not multipart cannot carry a file.
        let ct = content_type(req.headers());
        let mut multipart = Multipart::from_request(req, state).await.map_err(|_| {
            tracing::warn!(content_type = %ct, "Upload is not multipart form data");
            InputError::NoFile
        })?;

        loop {
            let field = multipart
                .next_field()
                .await
                .map_err(|e| InputError::Multipart(e.body_text()))?;
            let Some(field) = field else {
                tracing::warn!(field = UPLOAD_FIELD, "Multipart body has no upload field");
                return Err(InputError::NoFile.into());
            };
            if field.name() != Some(UPLOAD_FIELD) {
                continue;
            }

            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| InputError::Multipart(e.body_text()))?;
            if bytes.len() > MAX_UPLOAD_BYTES {
                return Err(InputError::TooLarge.into());
            }
            return Ok(UploadedFile {
                file_name,
                bytes: bytes.to_vec(),
            });
        }
    }
}

/// Names of the submitted symptom form fields. Values are ignored: a
/// symptom is present when its key is.
#[derive(Debug, Default)]
pub struct SymptomForm(pub Vec<String>);

#[axum::async_trait]
impl<S> FromRequest<S> for SymptomForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let ct = content_type(req.headers()).to_ascii_lowercase();

        if ct.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::Input(e.body_text()))?;
            let mut keys = Vec::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| ApiError::Input(e.body_text()))?
            {
                // File parts are not form fields.
                if field.file_name().is_some() {
                    continue;
                }
                if let Some(name) = field.name() {
                    keys.push(name.to_string());
                }
            }
            return Ok(SymptomForm(keys));
        }

        // No body type: nothing submitted.
        if ct.is_empty() {
            return Ok(SymptomForm::default());
        }

        if ct.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Validation(e.body_text()))?;
            return Ok(SymptomForm(pairs.into_iter().map(|(k, _)| k).collect()));
        }

        tracing::warn!(content_type = %ct, "Form data expected");
        Err(ApiError::UnsupportedMediaType(format!(
            "Unsupported Content-Type: {ct}. Expected form data"
        )))
    }
}
