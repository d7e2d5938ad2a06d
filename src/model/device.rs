use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The persisted unit of the catalog
///
/// Every field is always serialized: unknown scalars become `null`, unknown
/// lists `[]` and unknown image maps `{}`, so the output shape never depends on
/// how complete the upstream record was.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDevice {
    /// Unique, non-empty identifier within a dataset
    pub id: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub slug: Option<String>,
    pub release_date: Option<String>,
    pub status: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub display: Display,
    pub platform: Platform,
    pub memory: Memory,
    pub camera: Camera,
    pub battery: Battery,
    pub images: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Display {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub size: Option<String>,
    pub resolution: Option<String>,
    pub refresh_rate: Option<String>,
    pub protection: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub chipset: Option<String>,
    pub cpu: Option<String>,
    pub gpu: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub ram: Option<String>,
    pub storage: Option<String>,
    pub card_slot: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub rear: Vec<String>,
    pub front: Vec<String>,
    pub video: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    pub capacity: Option<String>,
    pub charging: Option<String>,
    pub wireless_charging: Option<String>,
}

impl CanonicalDevice {
    /// Creates an empty record with the given id
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Whether the record carries a usable identifier
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }
}
