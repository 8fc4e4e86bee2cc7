use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic kind of an output or input point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Battery,
    Dimmer,
    ElectricCurrent,
    ElectricEnergy,
    ElectricPower,
    Humidity,
    Luminance,
    Motion,
    OnOffSwitch,
    PushButton,
    Temperature,
    Ultraviolet,
    Uptime,
    Voltage,
}

impl PointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Battery => "battery",
            Self::Dimmer => "dimmer",
            Self::ElectricCurrent => "electriccurrent",
            Self::ElectricEnergy => "electricenergy",
            Self::ElectricPower => "electricpower",
            Self::Humidity => "humidity",
            Self::Luminance => "luminance",
            Self::Motion => "motion",
            Self::OnOffSwitch => "onoffswitch",
            Self::PushButton => "pushbutton",
            Self::Temperature => "temperature",
            Self::Ultraviolet => "ultraviolet",
            Self::Uptime => "uptime",
            Self::Voltage => "voltage",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let kind = match s {
            "battery" => Self::Battery,
            "dimmer" => Self::Dimmer,
            "electriccurrent" => Self::ElectricCurrent,
            "electricenergy" => Self::ElectricEnergy,
            "electricpower" => Self::ElectricPower,
            "humidity" => Self::Humidity,
            "luminance" => Self::Luminance,
            "motion" => Self::Motion,
            "onoffswitch" => Self::OnOffSwitch,
            "pushbutton" => Self::PushButton,
            "temperature" => Self::Temperature,
            "ultraviolet" => Self::Ultraviolet,
            "uptime" => Self::Uptime,
            "voltage" => Self::Voltage,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical data type exposed by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Bool,
    Bytes,
    Enum,
    Number,
    String,
}

/// Logical measurement unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "A")]
    Ampere,
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
    #[serde(rename = "kWh")]
    KWh,
    #[serde(rename = "lux")]
    Lux,
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "V")]
    Volt,
    #[serde(rename = "W")]
    Watt,
}

/// Identifier of a point, `"{address}/{kind}/{instance}"`
macro_rules! point_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(address: &str, kind: PointKind, instance: &str) -> Self {
                Self(format!("{}/{}/{}", address, kind, instance))
            }

            /// Parses `"{address}/{kind}/{instance}"`
            pub fn parse(s: &str) -> Option<Self> {
                let mut parts = s.splitn(3, '/');
                let address = parts.next().filter(|p| !p.is_empty())?;
                let kind = PointKind::parse(parts.next()?)?;
                let instance = parts.next().filter(|p| !p.is_empty())?;
                Some(Self::new(address, kind, instance))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Device address part of the identifier
            pub fn address(&self) -> &str {
                self.0.split('/').next().unwrap_or_default()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

point_id!(OutputId);
point_id!(InputId);

/// A sensor reading or actuator state exposed by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputPoint {
    pub id: OutputId,
    pub address: String,
    pub kind: PointKind,
    pub instance: String,
    pub data_type: Option<DataType>,
    pub unit: Option<Unit>,
    pub value: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OutputPoint {
    pub fn new(address: &str, kind: PointKind, instance: &str) -> Self {
        Self {
            id: OutputId::new(address, kind, instance),
            address: address.to_string(),
            kind,
            instance: instance.to_string(),
            data_type: None,
            unit: None,
            value: None,
            updated_at: None,
        }
    }
}

/// Writable counterpart of an output, accepting commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputPoint {
    pub id: InputId,
    pub address: String,
    pub kind: PointKind,
    pub instance: String,
    pub data_type: Option<DataType>,
    pub unit: Option<Unit>,
    pub description: Option<String>,
}

impl InputPoint {
    pub fn new(address: &str, kind: PointKind, instance: &str) -> Self {
        Self {
            id: InputId::new(address, kind, instance),
            address: address.to_string(),
            kind,
            instance: instance.to_string(),
            data_type: None,
            unit: None,
            description: None,
        }
    }

    pub fn is_push_button(&self) -> bool {
        self.kind == PointKind::PushButton
    }
}
