use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Opaque identifier of a controller value. Unique for one controller session
/// and never reused while the session lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueId(pub u64);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Primitive storage type the controller declares for a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Bool,
    Byte,
    Decimal,
    Int,
    List,
    Short,
    String,
    Button,
    Raw,
}

impl PrimitiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Decimal => "decimal",
            Self::Int => "int",
            Self::List => "list",
            Self::Short => "short",
            Self::String => "string",
            Self::Button => "button",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse category the controller assigns to a value.
/// Not reliable enough on its own to tell a sensor from a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    System,
    User,
    Config,
}

/// Descriptor of a single value reported by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportValue {
    pub id: ValueId,
    pub home_id: u32,
    pub node_id: u8,
    pub primitive: PrimitiveType,
    pub genre: Genre,
    pub label: String,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub instance: u8,
    #[serde(default)]
    pub index: u16,
    /// Current value in its string form
    #[serde(default)]
    pub value: String,
    /// Selectable items for list values
    #[serde(default)]
    pub choices: Vec<String>,
}

impl TransportValue {
    pub fn is_writable(&self) -> bool {
        !self.read_only
    }

    /// Hardware address of the owning device in the registry
    pub fn hw_address(&self) -> String {
        self.node_id.to_string()
    }

    /// Name the value is known by in the registry.
    ///
    /// Configuration parameters are identified by their parameter number,
    /// everything else by its label.
    pub fn attribute_name(&self) -> String {
        match self.genre {
            Genre::Config => self.index.to_string(),
            _ => self.label.clone(),
        }
    }

    pub fn description(&self) -> String {
        match self.genre {
            Genre::Config => format!("{}: {}", self.index, self.label),
            _ => self.label.clone(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

/// A value converted to the primitive type the controller expects on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    Bool(bool),
    Short(i16),
    Int(i32),
    Decimal(f32),
    Byte(u8),
    String(String),
    ListSelection(String),
}

impl TypedValue {
    /// Converts a textual payload into the value for `primitive`.
    ///
    /// Booleans are strict here: `true`, `false`, `t`, `f`, `1` and `0` in any case.
    pub fn parse(primitive: PrimitiveType, payload: &str) -> Result<Self, DomainError> {
        let trimmed = payload.trim();
        let invalid = |reason: String| DomainError::InvalidPayload {
            payload: payload.to_string(),
            primitive,
            reason,
        };

        match primitive {
            PrimitiveType::Bool | PrimitiveType::Button => parse_strict_bool(trimmed)
                .map(Self::Bool)
                .ok_or_else(|| invalid("expected true or false".to_string())),
            PrimitiveType::Short => trimmed
                .parse::<i16>()
                .map(Self::Short)
                .map_err(|e| invalid(e.to_string())),
            PrimitiveType::Int => trimmed
                .parse::<i32>()
                .map(Self::Int)
                .map_err(|e| invalid(e.to_string())),
            PrimitiveType::Decimal => trimmed
                .parse::<f32>()
                .map(Self::Decimal)
                .map_err(|e| invalid(e.to_string())),
            PrimitiveType::Byte => trimmed
                .parse::<u8>()
                .map(Self::Byte)
                .map_err(|e| invalid(e.to_string())),
            PrimitiveType::String => Ok(Self::String(payload.to_string())),
            PrimitiveType::List => Ok(Self::ListSelection(payload.to_string())),
            PrimitiveType::Raw => Err(DomainError::UnsupportedPrimitiveType(primitive)),
        }
    }

    /// Strict boolean flag, as accepted for `Bool` values
    pub fn parse_flag(payload: &str) -> Result<bool, DomainError> {
        parse_strict_bool(payload.trim()).ok_or_else(|| DomainError::InvalidPayload {
            payload: payload.to_string(),
            primitive: PrimitiveType::Bool,
            reason: "expected true or false".to_string(),
        })
    }

    /// Switch semantics: anything is "on" except `0`, `off` and `false`.
    pub fn switch(payload: &str) -> Self {
        let lowered = payload.trim().to_lowercase();
        Self::Bool(!matches!(lowered.as_str(), "0" | "off" | "false"))
    }
}

fn parse_strict_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_value() -> TransportValue {
        TransportValue {
            id: ValueId(7),
            home_id: 0xcafe,
            node_id: 5,
            primitive: PrimitiveType::Byte,
            genre: Genre::Config,
            label: "Wake-up Interval".to_string(),
            units: String::new(),
            help: String::new(),
            read_only: false,
            instance: 1,
            index: 12,
            value: "3".to_string(),
            choices: vec![],
        }
    }

    #[test]
    fn test_config_values_are_named_by_index() {
        let value = config_value();
        assert_eq!(value.attribute_name(), "12");
        assert_eq!(value.description(), "12: Wake-up Interval");
        assert_eq!(value.hw_address(), "5");
    }

    #[test]
    fn test_other_genres_are_named_by_label() {
        let value = TransportValue {
            genre: Genre::User,
            ..config_value()
        };
        assert_eq!(value.attribute_name(), "Wake-up Interval");
        assert_eq!(value.description(), "Wake-up Interval");
    }

    #[test]
    fn test_switch_rule() {
        assert_eq!(TypedValue::switch("0"), TypedValue::Bool(false));
        assert_eq!(TypedValue::switch("OFF"), TypedValue::Bool(false));
        assert_eq!(TypedValue::switch("False"), TypedValue::Bool(false));
        assert_eq!(TypedValue::switch("on"), TypedValue::Bool(true));
        assert_eq!(TypedValue::switch("1"), TypedValue::Bool(true));
        assert_eq!(TypedValue::switch("whatever"), TypedValue::Bool(true));
    }

    #[test]
    fn test_parse_numeric_types() {
        assert_eq!(
            TypedValue::parse(PrimitiveType::Short, "-12").unwrap(),
            TypedValue::Short(-12)
        );
        assert_eq!(
            TypedValue::parse(PrimitiveType::Int, "70000").unwrap(),
            TypedValue::Int(70000)
        );
        assert_eq!(
            TypedValue::parse(PrimitiveType::Decimal, "21.5").unwrap(),
            TypedValue::Decimal(21.5)
        );
        assert_eq!(
            TypedValue::parse(PrimitiveType::Byte, " 200 ").unwrap(),
            TypedValue::Byte(200)
        );
    }

    #[test]
    fn test_parse_out_of_range_is_invalid_payload() {
        let err = TypedValue::parse(PrimitiveType::Short, "40000").unwrap_err();
        assert!(matches!(err, DomainError::InvalidPayload { primitive: PrimitiveType::Short, .. }));

        let err = TypedValue::parse(PrimitiveType::Byte, "-1").unwrap_err();
        assert!(matches!(err, DomainError::InvalidPayload { .. }));
    }

    #[test]
    fn test_parse_strict_bool() {
        assert_eq!(
            TypedValue::parse(PrimitiveType::Bool, "TRUE").unwrap(),
            TypedValue::Bool(true)
        );
        assert_eq!(
            TypedValue::parse(PrimitiveType::Button, "0").unwrap(),
            TypedValue::Bool(false)
        );
        assert!(TypedValue::parse(PrimitiveType::Bool, "on").is_err());
    }

    #[test]
    fn test_parse_text_types_keep_payload() {
        assert_eq!(
            TypedValue::parse(PrimitiveType::List, "Normal").unwrap(),
            TypedValue::ListSelection("Normal".to_string())
        );
        assert_eq!(
            TypedValue::parse(PrimitiveType::String, " kitchen ").unwrap(),
            TypedValue::String(" kitchen ".to_string())
        );
    }

    #[test]
    fn test_raw_is_unsupported() {
        assert_eq!(
            TypedValue::parse(PrimitiveType::Raw, "00ff").unwrap_err(),
            DomainError::UnsupportedPrimitiveType(PrimitiveType::Raw)
        );
    }
}
