mod cache;
mod fallback;
mod live;
mod local;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use madadgar_core::{FacilityCandidate, Service, Tier};

pub use cache::{CacheKey, TierCache};
pub use fallback::{ResolveError, StaticContact, StaticDirectory};
pub use live::PlacesClient;
pub use local::{FacilityDataset, LocalFacility};

pub const DEFAULT_RADIUS_KM: f64 = 25.0;

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let lat1_r = lat1.to_radians();
    let lat2_r = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1_r.cos() * lat2_r.cos() * (d_lon / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().asin()
}

/// Distance-based travel estimate used when no live travel-time data exists:
/// 1.8 minutes per kilometre through city traffic, never under 6.
pub fn eta_minutes(distance_km: f64) -> u32 {
    ((distance_km * 1.8) as u32).max(6)
}

/// A cacheable facility source. The static floor sits outside this enum: it
/// is infallible by construction and never cached.
#[derive(Clone)]
pub enum TierSource {
    Live(PlacesClient),
    Local(FacilityDataset),
}

impl TierSource {
    pub fn tier(&self) -> Tier {
        match self {
            Self::Live(_) => Tier::Live,
            Self::Local(_) => Tier::Local,
        }
    }

    pub async fn locate(
        &self,
        service: Service,
        lat: f64,
        lon: f64,
        radius_km: f64,
    ) -> Result<Vec<FacilityCandidate>> {
        match self {
            Self::Live(client) => client.nearby(service, lat, lon, radius_km).await,
            Self::Local(dataset) => Ok(dataset.lookup(service, lat, lon, radius_km)),
        }
    }
}

/// Resolves a service plus coordinates into ranked facility candidates
/// through three ordered tiers: live provider, curated local dataset,
/// compiled-in static contacts.
///
/// Tier failures (timeout, error, rate limit, nothing nearby) fall through
/// to the next tier and are never surfaced to the caller. The only error a
/// caller can see is a service with no static contact configured.
pub struct FacilityResolver {
    sources: Vec<TierSource>,
    fallback: StaticDirectory,
    cache: TierCache,
}

impl FacilityResolver {
    pub fn new(sources: Vec<TierSource>, fallback: StaticDirectory) -> Self {
        Self {
            sources,
            fallback,
            cache: TierCache::default(),
        }
    }

    /// Wire up the production tier order: live provider when configured,
    /// then the local dataset under `data_root`, then the static floor.
    pub fn from_env(data_root: impl AsRef<Path>) -> Result<Self> {
        let mut sources = Vec::new();
        if let Some(client) = PlacesClient::from_env()? {
            sources.push(TierSource::Live(client));
        } else {
            tracing::info!("live facility tier not configured, starting without it");
        }
        sources.push(TierSource::Local(FacilityDataset::from_dir(data_root)));

        Ok(Self::new(sources, StaticDirectory::default()))
    }

    pub fn has_live_tier(&self) -> bool {
        self.sources
            .iter()
            .any(|source| matches!(source, TierSource::Live(_)))
    }

    pub fn dataset(&self) -> Option<&FacilityDataset> {
        self.sources.iter().find_map(|source| match source {
            TierSource::Local(dataset) => Some(dataset),
            TierSource::Live(_) => None,
        })
    }

    pub async fn resolve(
        &self,
        service: Service,
        lat: f64,
        lon: f64,
        radius_km: Option<f64>,
    ) -> Result<Vec<FacilityCandidate>, ResolveError> {
        let radius = radius_km.unwrap_or(DEFAULT_RADIUS_KM).clamp(1.0, 100.0);
        let key = CacheKey::new(service, lat, lon, radius);

        for source in &self.sources {
            let tier = source.tier();
            let load_source = source.clone();
            let candidates = self
                .cache
                .fetch(tier, key, ttl_for(tier, service), async move {
                    load_source.locate(service, lat, lon, radius).await
                })
                .await;

            if let Some(candidates) = candidates {
                tracing::debug!(
                    tier = tier.as_code(),
                    service = service.as_code(),
                    count = candidates.len(),
                    "facilities resolved"
                );
                return Ok(candidates);
            }
        }

        self.fallback.locate(service, lat, lon)
    }
}

/// Live results go stale within the hour; the curated dataset changes on the
/// cadence of its service.
fn ttl_for(tier: Tier, service: Service) -> Duration {
    match (tier, service) {
        (Tier::Live, _) => Duration::from_secs(60 * 60),
        (Tier::Local, Service::Medical) => Duration::from_secs(2 * 60 * 60),
        (Tier::Local, Service::General) => Duration::from_secs(6 * 60 * 60),
        (Tier::Local, _) => Duration::from_secs(4 * 60 * 60),
        (Tier::Static, _) => Duration::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_matches_known_distances() {
        // Karachi to Hyderabad is roughly 150 km.
        let distance = haversine_km(24.8607, 67.0011, 25.3960, 68.3578);
        assert!((distance - 150.0).abs() < 15.0, "got {distance}");
        assert!(haversine_km(24.86, 67.0, 24.86, 67.0) < 0.001);
    }

    #[test]
    fn eta_has_a_floor() {
        assert_eq!(eta_minutes(0.0), 6);
        assert_eq!(eta_minutes(10.0), 18);
    }

    #[tokio::test]
    async fn static_floor_guarantees_a_candidate() {
        // No live tier, empty dataset: both cacheable tiers miss.
        let resolver = FacilityResolver::new(
            vec![TierSource::Local(FacilityDataset::from_records(Vec::new()))],
            StaticDirectory::default(),
        );

        let candidates = resolver
            .resolve(Service::Medical, 24.86, 67.0, None)
            .await
            .unwrap();
        assert!(!candidates.is_empty());
        assert!(candidates.iter().all(|c| c.source_tier == Tier::Static));
    }

    #[tokio::test]
    async fn local_tier_wins_when_it_has_candidates() {
        let dataset = FacilityDataset::from_records(vec![LocalFacility {
            service: Service::Police,
            name: "Saddar Station".to_string(),
            lat: 24.85,
            lon: 67.02,
            phone: Some("15".to_string()),
        }]);
        let resolver =
            FacilityResolver::new(vec![TierSource::Local(dataset)], StaticDirectory::default());

        let candidates = resolver
            .resolve(Service::Police, 24.86, 67.0, None)
            .await
            .unwrap();
        assert_eq!(candidates[0].source_tier, Tier::Local);
        assert_eq!(candidates[0].name, "Saddar Station");
    }

    #[tokio::test]
    async fn missing_static_contact_is_fatal() {
        let resolver = FacilityResolver::new(
            Vec::new(),
            StaticDirectory::with_contacts(std::collections::HashMap::new()),
        );
        let error = resolver
            .resolve(Service::Disaster, 24.86, 67.0, None)
            .await
            .unwrap_err();
        assert!(matches!(error, ResolveError::MissingStaticContact(_)));
    }
}
