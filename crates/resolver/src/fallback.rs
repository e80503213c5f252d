use std::collections::HashMap;

use madadgar_core::{FacilityCandidate, Service, Tier};
use thiserror::Error;

use crate::{eta_minutes, haversine_km};

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The one fatal configuration error: without a static contact the
    /// system cannot guarantee even a baseline response for the service.
    #[error("no static contact configured for service '{0}'")]
    MissingStaticContact(&'static str),
}

#[derive(Debug, Clone)]
pub struct StaticContact {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub phone: &'static str,
}

/// Compiled-in contact floor. Always available, never cached; the reliability
/// guarantee of the whole resolver rests on this table.
pub struct StaticDirectory {
    contacts: HashMap<Service, Vec<StaticContact>>,
}

impl Default for StaticDirectory {
    fn default() -> Self {
        let contacts = HashMap::from([
            (
                Service::Medical,
                vec![
                    StaticContact {
                        name: "Karachi General Hospital",
                        lat: 24.8615,
                        lon: 67.0099,
                        phone: "+92-21-1234567",
                    },
                    StaticContact {
                        name: "Dow University Hospital",
                        lat: 24.8864,
                        lon: 67.0743,
                        phone: "+92-21-5566778",
                    },
                    StaticContact {
                        name: "Edhi Ambulance Service",
                        lat: 24.8607,
                        lon: 67.0011,
                        phone: "115",
                    },
                ],
            ),
            (
                Service::Police,
                vec![StaticContact {
                    name: "Police Emergency Helpline",
                    lat: 24.8600,
                    lon: 67.0100,
                    phone: "15",
                }],
            ),
            (
                Service::Disaster,
                vec![
                    StaticContact {
                        name: "Fire Brigade Control Room",
                        lat: 24.8500,
                        lon: 67.0000,
                        phone: "16",
                    },
                    StaticContact {
                        name: "Rescue 1122",
                        lat: 24.8700,
                        lon: 67.0300,
                        phone: "1122",
                    },
                ],
            ),
            (
                Service::General,
                vec![StaticContact {
                    name: "City Emergency Helpline",
                    lat: 24.8607,
                    lon: 67.0011,
                    phone: "1122",
                }],
            ),
        ]);

        Self { contacts }
    }
}

impl StaticDirectory {
    pub fn with_contacts(contacts: HashMap<Service, Vec<StaticContact>>) -> Self {
        Self { contacts }
    }

    pub fn locate(
        &self,
        service: Service,
        lat: f64,
        lon: f64,
    ) -> Result<Vec<FacilityCandidate>, ResolveError> {
        let contacts = self
            .contacts
            .get(&service)
            .filter(|entries| !entries.is_empty())
            .ok_or(ResolveError::MissingStaticContact(service.as_code()))?;

        let mut candidates: Vec<FacilityCandidate> = contacts
            .iter()
            .map(|contact| {
                let distance = haversine_km(lat, lon, contact.lat, contact.lon);
                FacilityCandidate {
                    name: contact.name.to_string(),
                    lat: contact.lat,
                    lon: contact.lon,
                    phone: Some(contact.phone.to_string()),
                    distance_km: distance,
                    eta_minutes: eta_minutes(distance),
                    rating: None,
                    source_tier: Tier::Static,
                }
            })
            .collect();

        candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_service_has_a_contact() {
        let directory = StaticDirectory::default();
        for service in Service::BY_PRIORITY {
            let candidates = directory.locate(service, 24.86, 67.0).unwrap();
            assert!(!candidates.is_empty());
            assert!(candidates.iter().all(|c| c.source_tier == Tier::Static));
        }
    }

    #[test]
    fn empty_table_is_the_fatal_error() {
        let directory = StaticDirectory::with_contacts(HashMap::new());
        let error = directory.locate(Service::Medical, 24.86, 67.0).unwrap_err();
        assert!(matches!(error, ResolveError::MissingStaticContact("medical")));
    }
}
