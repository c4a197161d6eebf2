//! HealthBot HTTP router.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS → 2. Request log → 3. Body limit → Handler

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::imaging::MAX_UPLOAD_BYTES;

/// Request body cap: the largest image plus multipart framing.
pub const BODY_LIMIT_BYTES: usize = MAX_UPLOAD_BYTES + 2 * 1024 * 1024;

/// Build the full router with every endpoint mounted.
pub fn build_router(ctx: ApiContext) -> Router {
    let cors = cors_layer(&ctx.config.allowed_origins);

    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/predict/disease", post(endpoints::predict::disease))
        .route("/predict/diabetes", post(endpoints::predict::diabetes))
        .route("/predict/heart_disease", post(endpoints::predict::heart_disease))
        .route("/predict/mental_health", post(endpoints::predict::mental_health))
        .route("/predict/chest_xray", post(endpoints::predict::chest_xray))
        .route("/predict/cancer", post(endpoints::predict::cancer))
        .route("/hospitals", post(endpoints::hospitals::search))
        .route("/api/chat", post(endpoints::chat::send))
        .route("/translate", post(endpoints::translate::translate))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(cors)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
