use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use madadgar_core::{FacilityCandidate, Service, Tier};
use serde::Deserialize;

use crate::{eta_minutes, haversine_km};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Client for the external places provider. Every call carries bounded
/// connect and request timeouts; there is no retry here, retrying belongs to
/// the next tier.
#[derive(Clone)]
pub struct PlacesClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl PlacesClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(8))
            .build()
            .context("failed to build places http client")?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `None` when no API key is configured; the live tier then always falls
    /// through.
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(api_key) = env::var("MADADGAR_PLACES_API_KEY") else {
            return Ok(None);
        };
        let base_url =
            env::var("MADADGAR_PLACES_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(api_key, base_url).map(Some)
    }

    pub async fn nearby(
        &self,
        service: Service,
        lat: f64,
        lon: f64,
        radius_km: f64,
    ) -> Result<Vec<FacilityCandidate>> {
        let url = format!("{}/nearbysearch/json", self.base_url);
        let radius_meters = ((radius_km * 1000.0) as u32).to_string();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("location", format!("{lat},{lon}").as_str()),
                ("radius", radius_meters.as_str()),
                ("type", place_type(service)),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("places nearby search request failed")?
            .error_for_status()
            .context("places nearby search rejected")?;

        let payload: NearbyResponse = response
            .json()
            .await
            .context("places nearby search returned invalid json")?;

        if payload.status != "OK" && payload.status != "ZERO_RESULTS" {
            bail!("places api returned status {}", payload.status);
        }

        let mut candidates: Vec<FacilityCandidate> = payload
            .results
            .into_iter()
            .map(|place| {
                let distance = haversine_km(lat, lon, place.geometry.location.lat, place.geometry.location.lng);
                FacilityCandidate {
                    name: place.name,
                    lat: place.geometry.location.lat,
                    lon: place.geometry.location.lng,
                    phone: None,
                    distance_km: distance,
                    eta_minutes: eta_minutes(distance),
                    rating: place.rating,
                    source_tier: Tier::Live,
                }
            })
            .collect();

        candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(candidates)
    }
}

/// The provider has no emergency-service taxonomy of its own; the closest
/// place types stand in per service.
fn place_type(service: Service) -> &'static str {
    match service {
        Service::Medical | Service::General => "hospital",
        Service::Police => "police",
        Service::Disaster => "fire_station",
    }
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    name: String,
    geometry: Geometry,
    rating: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Point,
}

#[derive(Debug, Deserialize)]
struct Point {
    lat: f64,
    lng: f64,
}
