//! Nearby hospital search.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::extract::JsonBody;
use crate::api::types::ApiContext;
use crate::geo::{Coordinates, PlaceRecord};
use crate::normalize::RawRequest;

#[derive(Serialize)]
pub struct HospitalsResponse {
    pub hospitals: Vec<PlaceRecord>,
}

/// `POST /hospitals` — body `{lat, lon}`.
pub async fn search(
    State(ctx): State<ApiContext>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<HospitalsResponse>, ApiError> {
    let raw = RawRequest::from_json(body)?;
    let origin = Coordinates::from_request(&raw).map_err(|e| {
        tracing::warn!(input = %raw, error = %e, "Hospital search rejected");
        e
    })?;

    let hospitals = ctx.geo.find_hospitals(origin).await.map_err(|e| {
        tracing::error!(lat = origin.lat, lon = origin.lon, error = %e, "Hospital search failed");
        e
    })?;
    Ok(Json(HospitalsResponse { hospitals }))
}
