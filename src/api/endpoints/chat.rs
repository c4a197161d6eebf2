//! Health chat: text or voice in, text (and speech) out.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::extract::JsonBody;
use crate::api::types::ApiContext;
use crate::assistant::{ChatReply, ChatRequest};

/// `POST /api/chat`
pub async fn send(
    State(ctx): State<ApiContext>,
    JsonBody(request): JsonBody<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let input_type = request.input_type;
    let reply = ctx.assistant.handle(request).await.map_err(|e| {
        tracing::warn!(?input_type, error = %e, "Chat request failed");
        e
    })?;
    Ok(Json(reply))
}
