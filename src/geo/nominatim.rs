//! Nominatim search, used to top up sparse Overpass results.

use serde::Deserialize;
use serde_json::Value;

use super::{Coordinates, PlaceRecord};
use crate::config::USER_AGENT;
use crate::upstream::{Service, UpstreamError};

/// Half-width of the bounding box around the query point, in degrees.
pub const VIEWBOX_SPAN_DEG: f64 = 0.05;
pub const RESULT_LIMIT: u32 = 10;

const NOT_LISTED: &str = "Not listed";

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub lat: Value,
    #[serde(default)]
    pub lon: Value,
    pub phone: Option<String>,
}

/// Nominatim encodes coordinates as strings; accept numbers too.
fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl SearchResult {
    fn to_place(&self, origin: Coordinates) -> Option<PlaceRecord> {
        let phone = self
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && *p != NOT_LISTED)?;
        if self.display_name.is_empty() {
            return None;
        }
        let name = self.display_name.split(',').next().unwrap_or_default().trim();
        let (lat, lon) = (coordinate(&self.lat)?, coordinate(&self.lon)?);

        Some(PlaceRecord {
            name: name.to_string(),
            address: self.display_name.clone(),
            phone: phone.to_string(),
            distance: origin.distance_to(lat, lon),
        })
    }
}

/// `left,top,right,bottom` box around `origin`.
pub fn viewbox(origin: Coordinates) -> String {
    format!(
        "{},{},{},{}",
        origin.lon - VIEWBOX_SPAN_DEG,
        origin.lat + VIEWBOX_SPAN_DEG,
        origin.lon + VIEWBOX_SPAN_DEG,
        origin.lat - VIEWBOX_SPAN_DEG
    )
}

/// Candidates in provider order; the caller dedupes and caps.
pub fn places(origin: Coordinates, results: &[SearchResult]) -> Vec<PlaceRecord> {
    results.iter().filter_map(|r| r.to_place(origin)).collect()
}

pub async fn search(
    service: &Service,
    origin: Coordinates,
) -> Result<Vec<PlaceRecord>, UpstreamError> {
    let limit = RESULT_LIMIT.to_string();
    let viewbox = viewbox(origin);
    let request = service
        .client
        .get(&service.url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .query(&[
            ("q", "hospital"),
            ("format", "json"),
            ("limit", limit.as_str()),
            ("viewbox", viewbox.as_str()),
            ("bounded", "1"),
        ]);
    let results: Vec<SearchResult> = service
        .send(request)
        .await?
        .json()
        .await
        .map_err(|e| service.classify(e))?;
    Ok(places(origin, &results))
}
