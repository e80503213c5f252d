use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use madadgar_core::{FacilityCandidate, Service, Tier};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;

/// Coordinates are rounded to 0.01 degrees (roughly a kilometre) so nearby
/// requests share a cache line; the radius collapses into 10 km buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub service: Service,
    pub lat_centi: i32,
    pub lon_centi: i32,
    pub radius_bucket: u8,
}

impl CacheKey {
    pub fn new(service: Service, lat: f64, lon: f64, radius_km: f64) -> Self {
        Self {
            service,
            lat_centi: (lat * 100.0).round() as i32,
            lon_centi: (lon * 100.0).round() as i32,
            radius_bucket: ((radius_km / 10.0).ceil() as u8).max(1),
        }
    }
}

/// A completed flight: `Some` with non-empty candidates, `None` when the
/// source failed or came back empty (both fall through to the next tier).
type FlightOutcome = Option<Vec<FacilityCandidate>>;

struct Slot {
    value: Vec<FacilityCandidate>,
    inserted_at: Instant,
    ttl: Duration,
}

struct CacheInner {
    slots: RwLock<HashMap<(Tier, CacheKey), Slot>>,
    inflight: Mutex<HashMap<(Tier, CacheKey), watch::Receiver<Option<FlightOutcome>>>>,
}

/// TTL cache with single-flight population per key.
///
/// A miss elects one leader whose load future runs in a detached task, so a
/// cancelled caller cannot abort a population other waiters depend on.
/// Concurrent callers for the same key await the leader's broadcast result.
#[derive(Clone)]
pub struct TierCache {
    inner: Arc<CacheInner>,
}

impl Default for TierCache {
    fn default() -> Self {
        Self {
            inner: Arc::new(CacheInner {
                slots: RwLock::new(HashMap::new()),
                inflight: Mutex::new(HashMap::new()),
            }),
        }
    }
}

impl TierCache {
    pub fn get(&self, tier: Tier, key: &CacheKey) -> Option<Vec<FacilityCandidate>> {
        {
            let slots = self.inner.slots.read();
            let slot = slots.get(&(tier, *key))?;
            if slot.inserted_at.elapsed() <= slot.ttl {
                return Some(slot.value.clone());
            }
        }
        self.inner.slots.write().remove(&(tier, *key));
        None
    }

    /// Return cached candidates, or collapse concurrent misses into a single
    /// run of `load`. `None` means the tier failed or had nothing nearby.
    pub async fn fetch<F>(
        &self,
        tier: Tier,
        key: CacheKey,
        ttl: Duration,
        load: F,
    ) -> Option<Vec<FacilityCandidate>>
    where
        F: Future<Output = anyhow::Result<Vec<FacilityCandidate>>> + Send + 'static,
    {
        if let Some(hit) = self.get(tier, &key) {
            return Some(hit);
        }

        let mut rx = {
            let mut inflight = self.inner.inflight.lock();
            // A flight may have landed between the cache probe and taking
            // this lock.
            if let Some(hit) = self.get(tier, &key) {
                return Some(hit);
            }
            if let Some(rx) = inflight.get(&(tier, key)) {
                rx.clone()
            } else {
                let (tx, rx) = watch::channel(None);
                inflight.insert((tier, key), rx.clone());

                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move {
                    let outcome: FlightOutcome = match load.await {
                        Ok(candidates) if !candidates.is_empty() => Some(candidates),
                        Ok(_) => {
                            tracing::debug!(tier = tier.as_code(), "facility source empty");
                            None
                        }
                        Err(error) => {
                            tracing::warn!(tier = tier.as_code(), %error, "facility source failed");
                            None
                        }
                    };

                    if let Some(candidates) = &outcome {
                        inner.slots.write().insert(
                            (tier, key),
                            Slot {
                                value: candidates.clone(),
                                inserted_at: Instant::now(),
                                ttl,
                            },
                        );
                    }
                    inner.inflight.lock().remove(&(tier, key));
                    let _ = tx.send(Some(outcome));
                });

                rx
            }
        };

        let result = match rx.wait_for(Option::is_some).await {
            Ok(value) => value.clone().flatten(),
            // Leader panicked before sending. Fall back to whatever landed.
            Err(_) => self.get(tier, &key),
        };
        result
    }
}
