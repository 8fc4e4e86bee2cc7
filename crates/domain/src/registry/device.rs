use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::point::DataType;
use crate::lifecycle::RunState;

pub const ATTR_MANUFACTURER: &str = "manufacturer";
pub const ATTR_MODEL: &str = "model";
pub const ATTR_NAME: &str = "name";
pub const ATTR_TYPE: &str = "type";
pub const ATTR_DESCRIPTION: &str = "description";
pub const ATTR_SOFTWARE_VERSION: &str = "softwareVersion";
pub const ATTR_LOCATION_NAME: &str = "locationName";
pub const ATTR_SECURITY_NODE: &str = "Security Node";

/// A user configurable setting of a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub data_type: DataType,
    pub description: String,
    pub writable: bool,
    pub value: Option<String>,
    /// Allowed values for enum settings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl ConfigEntry {
    pub fn new(data_type: DataType, description: impl Into<String>) -> Self {
        Self {
            data_type,
            description: description.into(),
            writable: true,
            value: None,
            choices: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub run_state: RunState,
    pub last_error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self {
            run_state: RunState::Unknown,
            last_error: None,
            updated_at: Utc::now(),
        }
    }
}

/// A device as known by the registry, keyed by its hardware address.
///
/// Created once on first sighting; rediscovery updates it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalDevice {
    pub address: String,
    pub attributes: BTreeMap<String, String>,
    pub config: BTreeMap<String, ConfigEntry>,
    pub status: DeviceStatus,
}

impl LogicalDevice {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            attributes: BTreeMap::new(),
            config: BTreeMap::new(),
            status: DeviceStatus::default(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_config(&self, name: &str) -> bool {
        self.config.contains_key(name)
    }

    /// Sets configuration values. Names without an entry get a string entry.
    pub fn apply_config_values(&mut self, values: &BTreeMap<String, String>) {
        for (name, value) in values {
            self.config
                .entry(name.clone())
                .or_insert_with(|| ConfigEntry::new(DataType::String, name.clone()))
                .value = Some(value.clone());
        }
    }

    pub fn set_status(&mut self, run_state: RunState, last_error: Option<String>) {
        self.status = DeviceStatus {
            run_state,
            last_error,
            updated_at: Utc::now(),
        };
    }
}
