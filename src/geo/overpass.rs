//! Overpass API: hospitals tagged `amenity=hospital` around a point.

use std::collections::HashMap;

use serde::Deserialize;

use super::{finalize, Coordinates, PlaceRecord};
use crate::upstream::{Service, UpstreamError};

/// Search radius in metres.
pub const SEARCH_RADIUS_M: u32 = 5000;

const NO_ADDRESS: &str = "No address";
const NO_PHONE: &str = "No phone";

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
pub struct Element {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl Element {
    /// First non-empty tag among `keys`.
    fn tag(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.tags.get(*k))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    fn to_place(&self, origin: Coordinates) -> Option<PlaceRecord> {
        let (lat, lon) = (self.lat?, self.lon?);
        let address = self
            .tag(&["addr:street", "addr:full"])
            .filter(|a| *a != NO_ADDRESS)?;
        let phone = self
            .tag(&["phone", "contact:phone"])
            .filter(|p| *p != NO_PHONE)?;

        Some(PlaceRecord {
            name: self.tag(&["name"]).unwrap_or("Unknown").to_string(),
            address: address.to_string(),
            phone: phone.to_string(),
            distance: origin.distance_to(lat, lon),
        })
    }
}

pub fn query(origin: Coordinates) -> String {
    format!(
        "[out:json][timeout:25];node[\"amenity\"=\"hospital\"](around:{},{},{});out body;",
        SEARCH_RADIUS_M, origin.lat, origin.lon
    )
}

/// Usable places from an Overpass response: nearest first, at most five.
pub fn places(origin: Coordinates, response: &OverpassResponse) -> Vec<PlaceRecord> {
    let found: Vec<PlaceRecord> = response
        .elements
        .iter()
        .filter_map(|e| e.to_place(origin))
        .collect();
    tracing::debug!(
        elements = response.elements.len(),
        usable = found.len(),
        "Overpass results filtered"
    );
    finalize(found)
}

pub async fn search(
    service: &Service,
    origin: Coordinates,
) -> Result<Vec<PlaceRecord>, UpstreamError> {
    let request = service
        .client
        .get(&service.url)
        .query(&[("data", query(origin))]);
    let response: OverpassResponse = service
        .send(request)
        .await?
        .json()
        .await
        .map_err(|e| service.classify(e))?;
    Ok(places(origin, &response))
}
