//! Nearby-hospital lookup over OpenStreetMap services.
//!
//! Overpass is authoritative; Nominatim only tops the list up when Overpass
//! yields fewer than [`MAX_PLACES`] usable entries.

pub mod nominatim;
pub mod overpass;

use serde::Serialize;

use crate::config::AppConfig;
use crate::normalize::{RawRequest, ValidationError};
use crate::upstream::{Service, UpstreamError};

/// Places returned per lookup.
pub const MAX_PLACES: usize = 5;

/// Degrees → km, flat-earth approximation.
pub const KM_PER_DEGREE: f64 = 111.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceRecord {
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Kilometres from the query point, two decimals.
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::InvalidNumber {
                field: "lat".into(),
                value: lat.to_string(),
            });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::InvalidNumber {
                field: "lon".into(),
                value: lon.to_string(),
            });
        }
        Ok(Self { lat, lon })
    }

    pub fn from_request(raw: &RawRequest) -> Result<Self, ValidationError> {
        let missing = raw.missing(&["lat", "lon"]);
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }
        Self::new(raw.number("lat")?, raw.number("lon")?)
    }

    /// Euclidean distance in degrees scaled to km, rounded to 2 decimals.
    pub fn distance_to(&self, lat: f64, lon: f64) -> f64 {
        let d = ((self.lat - lat).powi(2) + (self.lon - lon).powi(2)).sqrt() * KM_PER_DEGREE;
        (d * 100.0).round() / 100.0
    }
}

/// Sort ascending by distance, drop repeated names, cap at [`MAX_PLACES`].
pub fn finalize(mut places: Vec<PlaceRecord>) -> Vec<PlaceRecord> {
    places.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    let mut seen = std::collections::HashSet::new();
    places.retain(|p| seen.insert(p.name.clone()));
    places.truncate(MAX_PLACES);
    places
}

/// Top up `primary` with fallback candidates whose names are new, stopping
/// once the list is full.
pub fn merge(mut primary: Vec<PlaceRecord>, fallback: Vec<PlaceRecord>) -> Vec<PlaceRecord> {
    for candidate in fallback {
        if primary.len() >= MAX_PLACES {
            break;
        }
        if primary.iter().any(|p| p.name == candidate.name) {
            continue;
        }
        primary.push(candidate);
    }
    finalize(primary)
}

#[derive(Debug, Clone)]
pub struct GeoLookup {
    overpass: Service,
    nominatim: Service,
}

impl GeoLookup {
    pub fn new(overpass: Service, nominatim: Service) -> Self {
        Self {
            overpass,
            nominatim,
        }
    }

    pub fn from_config(config: &AppConfig, client: reqwest::Client) -> Self {
        Self::new(
            Service::new("overpass", &config.overpass_url, client.clone(), config.http_timeout),
            Service::new("nominatim", &config.nominatim_url, client, config.http_timeout),
        )
    }

    /// Up to five hospitals near `origin`, nearest first.
    ///
    /// A failed fallback is logged and the primary results are returned.
    pub async fn find_hospitals(
        &self,
        origin: Coordinates,
    ) -> Result<Vec<PlaceRecord>, UpstreamError> {
        let mut places = overpass::search(&self.overpass, origin).await?;

        if places.len() < MAX_PLACES {
            match nominatim::search(&self.nominatim, origin).await {
                Ok(candidates) => places = merge(places, candidates),
                Err(e) => tracing::warn!(error = %e, "Nominatim fallback failed"),
            }
        }

        tracing::info!(count = places.len(), "Found valid hospitals");
        Ok(places)
    }
}
