use chrono::{DateTime, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Urdu,
    RomanUrdu,
    English,
    Mixed,
}

impl Language {
    pub fn from_optional_str(value: Option<&str>) -> Option<Self> {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "ur" || v == "urdu" => Some(Self::Urdu),
            Some(v) if v == "ur-en" || v == "roman_urdu" || v == "roman" => Some(Self::RomanUrdu),
            Some(v) if v == "en" || v == "english" => Some(Self::English),
            Some(v) if v == "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Urdu => "urdu",
            Self::RomanUrdu => "roman_urdu",
            Self::English => "english",
            Self::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Medical,
    Police,
    Disaster,
    General,
}

impl Service {
    /// Priority order used when a message matches several services.
    pub const BY_PRIORITY: [Service; 4] = [
        Service::Medical,
        Service::Police,
        Service::Disaster,
        Service::General,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "medical" | "health" | "hospital" => Some(Self::Medical),
            "police" => Some(Self::Police),
            "disaster" | "fire" => Some(Self::Disaster),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::Police => "police",
            Self::Disaster => "disaster",
            Self::General => "general",
        }
    }
}

/// Severity tier. Serialized as the bare integer 1..=3 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Urgency {
    Critical,
    Serious,
    Routine,
}

impl Urgency {
    pub fn level(self) -> u8 {
        match self {
            Self::Critical => 1,
            Self::Serious => 2,
            Self::Routine => 3,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Critical),
            2 => Some(Self::Serious),
            3 => Some(Self::Routine),
            _ => None,
        }
    }
}

impl Serialize for Urgency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

impl<'de> Deserialize<'de> for Urgency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let level = u8::deserialize(deserializer)?;
        Urgency::from_level(level)
            .ok_or_else(|| D::Error::custom(format!("urgency level out of range: {level}")))
    }
}

/// Immutable outcome of the triage pipeline for one message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageResult {
    pub language: Language,
    pub service: Service,
    pub subservice: String,
    /// Matched terms in order of first occurrence in the text.
    pub keywords: Vec<String>,
    pub urgency: Urgency,
    pub greeting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Live,
    Local,
    Static,
}

impl Tier {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Local => "local",
            Self::Static => "static",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityCandidate {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub phone: Option<String>,
    pub distance_km: f64,
    pub eta_minutes: u32,
    pub rating: Option<f32>,
    pub source_tier: Tier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkQuality {
    Slow,
    Medium,
    Fast,
    Unknown,
}

impl NetworkQuality {
    /// Derive a quality from the caller-supplied hints only. Quality string
    /// wins over connection type; anything unrecognized is `Unknown`.
    pub fn detect(quality: Option<&str>, connection_type: Option<&str>) -> Self {
        match quality.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("slow") => return Self::Slow,
            Some("medium") => return Self::Medium,
            Some("fast") => return Self::Fast,
            Some("unknown") => return Self::Unknown,
            _ => {}
        }

        match connection_type.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("2g") => Self::Slow,
            Some("3g") => Self::Medium,
            Some("4g") | Some("5g") | Some("wifi") => Self::Fast,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub text: String,
    pub lat: f64,
    pub lon: f64,
    pub radius_km: Option<f64>,
    pub network_quality: Option<String>,
    pub connection_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReply {
    pub reply_text: String,
    pub minimal: bool,
    pub triage: TriageResult,
    pub facilities: Vec<FacilityCandidate>,
}

/// Persisted audit row for every handled dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_id: String,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub language: Language,
    pub service: Service,
    pub subservice: String,
    pub urgency: Urgency,
    pub facility_name: Option<String>,
    pub facility_tier: Option<Tier>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgency_round_trips_as_integer() {
        let json = serde_json::to_string(&Urgency::Critical).unwrap();
        assert_eq!(json, "1");
        let back: Urgency = serde_json::from_str("2").unwrap();
        assert_eq!(back, Urgency::Serious);
        assert!(serde_json::from_str::<Urgency>("4").is_err());
    }

    #[test]
    fn connection_type_maps_to_quality() {
        assert_eq!(NetworkQuality::detect(None, Some("2g")), NetworkQuality::Slow);
        assert_eq!(NetworkQuality::detect(None, Some("wifi")), NetworkQuality::Fast);
        assert_eq!(NetworkQuality::detect(Some("slow"), Some("wifi")), NetworkQuality::Slow);
        assert_eq!(NetworkQuality::detect(None, None), NetworkQuality::Unknown);
    }
}
