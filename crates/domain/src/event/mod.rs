use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod publisher;
pub use publisher::EventPublisher;

use crate::lifecycle::RunState;
use crate::registry::{ConfigEntry, InputPoint, OutputId, OutputPoint};

/// Changes of the device registry, as seen by its consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    /// A device appeared in the registry
    DeviceDiscovered {
        address: String,
        timestamp: DateTime<Utc>,
    },

    DeviceRemoved {
        address: String,
        timestamp: DateTime<Utc>,
    },

    /// Full attribute map after a merge
    DeviceAttributesUpdated {
        address: String,
        attributes: BTreeMap<String, String>,
        timestamp: DateTime<Utc>,
    },

    DeviceStatusChanged {
        address: String,
        run_state: RunState,
        last_error: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// Full configuration map after a change
    ConfigurationUpdated {
        address: String,
        config: BTreeMap<String, ConfigEntry>,
        timestamp: DateTime<Utc>,
    },

    OutputDiscovered {
        output: OutputPoint,
        timestamp: DateTime<Utc>,
    },

    OutputValueUpdated {
        output_id: OutputId,
        value: String,
        timestamp: DateTime<Utc>,
    },

    InputDiscovered {
        input: InputPoint,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent {
    pub fn device_discovered(address: impl Into<String>) -> Self {
        Self::DeviceDiscovered {
            address: address.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn device_removed(address: impl Into<String>) -> Self {
        Self::DeviceRemoved {
            address: address.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn device_attributes_updated(
        address: impl Into<String>,
        attributes: BTreeMap<String, String>,
    ) -> Self {
        Self::DeviceAttributesUpdated {
            address: address.into(),
            attributes,
            timestamp: Utc::now(),
        }
    }

    pub fn device_status_changed(
        address: impl Into<String>,
        run_state: RunState,
        last_error: Option<String>,
    ) -> Self {
        Self::DeviceStatusChanged {
            address: address.into(),
            run_state,
            last_error,
            timestamp: Utc::now(),
        }
    }

    pub fn configuration_updated(
        address: impl Into<String>,
        config: BTreeMap<String, ConfigEntry>,
    ) -> Self {
        Self::ConfigurationUpdated {
            address: address.into(),
            config,
            timestamp: Utc::now(),
        }
    }

    pub fn output_discovered(output: OutputPoint) -> Self {
        Self::OutputDiscovered {
            output,
            timestamp: Utc::now(),
        }
    }

    pub fn output_value_updated(output_id: OutputId, value: impl Into<String>) -> Self {
        Self::OutputValueUpdated {
            output_id,
            value: value.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn input_discovered(input: InputPoint) -> Self {
        Self::InputDiscovered {
            input,
            timestamp: Utc::now(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::DeviceDiscovered { timestamp, .. } => *timestamp,
            Self::DeviceRemoved { timestamp, .. } => *timestamp,
            Self::DeviceAttributesUpdated { timestamp, .. } => *timestamp,
            Self::DeviceStatusChanged { timestamp, .. } => *timestamp,
            Self::ConfigurationUpdated { timestamp, .. } => *timestamp,
            Self::OutputDiscovered { timestamp, .. } => *timestamp,
            Self::OutputValueUpdated { timestamp, .. } => *timestamp,
            Self::InputDiscovered { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &str {
        match self {
            Self::DeviceDiscovered { .. } => "DeviceDiscovered",
            Self::DeviceRemoved { .. } => "DeviceRemoved",
            Self::DeviceAttributesUpdated { .. } => "DeviceAttributesUpdated",
            Self::DeviceStatusChanged { .. } => "DeviceStatusChanged",
            Self::ConfigurationUpdated { .. } => "ConfigurationUpdated",
            Self::OutputDiscovered { .. } => "OutputDiscovered",
            Self::OutputValueUpdated { .. } => "OutputValueUpdated",
            Self::InputDiscovered { .. } => "InputDiscovered",
        }
    }

    /// Address of the device the event belongs to
    pub fn address(&self) -> &str {
        match self {
            Self::DeviceDiscovered { address, .. }
            | Self::DeviceRemoved { address, .. }
            | Self::DeviceAttributesUpdated { address, .. }
            | Self::DeviceStatusChanged { address, .. }
            | Self::ConfigurationUpdated { address, .. } => address,
            Self::OutputDiscovered { output, .. } => &output.address,
            Self::OutputValueUpdated { output_id, .. } => output_id.address(),
            Self::InputDiscovered { input, .. } => &input.address,
        }
    }
}
