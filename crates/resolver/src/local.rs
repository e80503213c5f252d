use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use madadgar_core::{FacilityCandidate, Service, Tier};
use parking_lot::RwLock;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::{eta_minutes, haversine_km};

/// One validated facility row from the curated regional dataset.
#[derive(Debug, Clone)]
pub struct LocalFacility {
    pub service: Service,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegionDocument {
    region: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    facilities: HashMap<String, Vec<RawFacility>>,
}

#[derive(Debug, Deserialize)]
struct RawFacility {
    name: String,
    lat: f64,
    lon: f64,
    phone: Option<String>,
}

struct DatasetInner {
    root: Option<PathBuf>,
    records: RwLock<Vec<LocalFacility>>,
}

/// Periodically curated facility listing, one JSON document per region,
/// loaded at startup and hot-reloadable.
#[derive(Clone)]
pub struct FacilityDataset {
    inner: Arc<DatasetInner>,
}

impl FacilityDataset {
    /// A missing directory is a degraded tier, not a startup failure: the
    /// dataset loads empty and every lookup falls through.
    pub fn from_dir(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let records = if root.is_dir() {
            load_records(&root)
        } else {
            tracing::warn!(root = %root.display(), "facility dataset directory missing");
            Vec::new()
        };

        tracing::info!(facilities = records.len(), "loaded local facility dataset");
        Self {
            inner: Arc::new(DatasetInner {
                root: Some(root),
                records: RwLock::new(records),
            }),
        }
    }

    pub fn from_records(records: Vec<LocalFacility>) -> Self {
        Self {
            inner: Arc::new(DatasetInner {
                root: None,
                records: RwLock::new(records),
            }),
        }
    }

    /// Re-walk the dataset directory and swap the records in place.
    pub fn reload(&self) -> Result<usize> {
        let root = self
            .inner
            .root
            .as_ref()
            .context("facility dataset has no backing directory")?;
        let records = load_records(root);
        let count = records.len();
        *self.inner.records.write() = records;
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.inner.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lookup(
        &self,
        service: Service,
        lat: f64,
        lon: f64,
        radius_km: f64,
    ) -> Vec<FacilityCandidate> {
        let records = self.inner.records.read();
        let mut candidates: Vec<FacilityCandidate> = records
            .iter()
            .filter(|f| f.service == service)
            .filter_map(|f| {
                let distance = haversine_km(lat, lon, f.lat, f.lon);
                (distance <= radius_km).then(|| FacilityCandidate {
                    name: f.name.clone(),
                    lat: f.lat,
                    lon: f.lon,
                    phone: f.phone.clone(),
                    distance_km: distance,
                    eta_minutes: eta_minutes(distance),
                    rating: None,
                    source_tier: Tier::Local,
                })
            })
            .collect();

        candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        candidates
    }
}

fn load_records(root: &Path) -> Vec<LocalFacility> {
    let mut records = Vec::new();

    for dir_entry in WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|ext| ext.to_str()) == Some("json"))
    {
        let path = dir_entry.path();
        match parse_region_file(path) {
            Ok(mut region_records) => records.append(&mut region_records),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping unreadable region document");
            }
        }
    }

    records
}

fn parse_region_file(path: &Path) -> Result<Vec<LocalFacility>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed reading region document: {}", path.display()))?;
    let document: RegionDocument = serde_json::from_str(&raw)
        .with_context(|| format!("invalid region document: {}", path.display()))?;
    tracing::debug!(
        region = %document.region,
        version = document.version.as_deref().unwrap_or("unversioned"),
        "loaded region document"
    );

    let mut records = Vec::new();
    for (service_name, facilities) in document.facilities {
        let Some(service) = Service::parse(&service_name) else {
            tracing::warn!(region = %document.region, service = %service_name, "unknown service in region document");
            continue;
        };

        for raw_facility in facilities {
            if !is_valid(&raw_facility) {
                tracing::warn!(
                    region = %document.region,
                    name = %raw_facility.name,
                    "dropping facility with invalid fields"
                );
                continue;
            }
            records.push(LocalFacility {
                service,
                name: raw_facility.name.trim().to_string(),
                lat: raw_facility.lat,
                lon: raw_facility.lon,
                phone: raw_facility.phone.map(normalize_phone),
            });
        }
    }

    Ok(records)
}

fn is_valid(facility: &RawFacility) -> bool {
    !facility.name.trim().is_empty()
        && (-90.0..=90.0).contains(&facility.lat)
        && (-180.0..=180.0).contains(&facility.lon)
}

fn normalize_phone(phone: String) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+' || *c == '-')
        .collect()
}
