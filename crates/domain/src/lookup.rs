use std::collections::HashMap;

use crate::registry::{DataType, PointKind, Unit};
use crate::transport::PrimitiveType;

/// Static mapping tables used to shape the device model.
///
/// Built once and passed to the components that need them, so tests can
/// substitute their own tables.
#[derive(Debug, Clone)]
pub struct LookupTables {
    labels: HashMap<String, PointKind>,
    data_types: HashMap<PrimitiveType, DataType>,
    units: HashMap<String, Unit>,
}

impl LookupTables {
    pub fn builder() -> LookupTablesBuilder {
        LookupTablesBuilder::default()
    }

    /// Output kind for a value label, exact match
    pub fn point_kind(&self, label: &str) -> Option<PointKind> {
        self.labels.get(label).copied()
    }

    pub fn data_type(&self, primitive: PrimitiveType) -> Option<DataType> {
        self.data_types.get(&primitive).copied()
    }

    /// Unit for a controller unit string. Case-insensitive, otherwise exact.
    pub fn unit(&self, units: &str) -> Option<Unit> {
        self.units.get(&units.to_lowercase()).copied()
    }
}

impl Default for LookupTables {
    fn default() -> Self {
        Self::builder()
            .label("Battery", PointKind::Battery)
            .label("Battery Level", PointKind::Battery)
            .label("Brightness", PointKind::Luminance)
            .label("Brightness Level", PointKind::Luminance)
            .label("Luminance", PointKind::Luminance)
            .label("Burglar", PointKind::Motion)
            .label("Motion", PointKind::Motion)
            .label("Sensor", PointKind::Motion)
            .label("Current", PointKind::ElectricCurrent)
            .label("Dimmer", PointKind::Dimmer)
            .label("Energy", PointKind::ElectricEnergy)
            .label("Light", PointKind::OnOffSwitch)
            .label("Switch", PointKind::OnOffSwitch)
            .label("Uptime", PointKind::Uptime)
            .label("Power", PointKind::ElectricPower)
            .label("Relative Humidity", PointKind::Humidity)
            .label("Temperature", PointKind::Temperature)
            .label("Ultraviolet", PointKind::Ultraviolet)
            .label("Voltage", PointKind::Voltage)
            .data_type(PrimitiveType::Bool, DataType::Bool)
            .data_type(PrimitiveType::Button, DataType::Bool)
            .data_type(PrimitiveType::Byte, DataType::Number)
            .data_type(PrimitiveType::Decimal, DataType::Number)
            .data_type(PrimitiveType::Int, DataType::Number)
            .data_type(PrimitiveType::Short, DataType::Number)
            .data_type(PrimitiveType::List, DataType::Enum)
            .data_type(PrimitiveType::Raw, DataType::Bytes)
            .data_type(PrimitiveType::String, DataType::String)
            .unit("%", Unit::Percent)
            .unit("A", Unit::Ampere)
            .unit("C", Unit::Celsius)
            .unit("F", Unit::Fahrenheit)
            .unit("kWh", Unit::KWh)
            .unit("lux", Unit::Lux)
            .unit("V", Unit::Volt)
            .unit("W", Unit::Watt)
            .build()
    }
}

#[derive(Debug, Default)]
pub struct LookupTablesBuilder {
    labels: HashMap<String, PointKind>,
    data_types: HashMap<PrimitiveType, DataType>,
    units: HashMap<String, Unit>,
}

impl LookupTablesBuilder {
    pub fn label(mut self, label: impl Into<String>, kind: PointKind) -> Self {
        self.labels.insert(label.into(), kind);
        self
    }

    pub fn data_type(mut self, primitive: PrimitiveType, data_type: DataType) -> Self {
        self.data_types.insert(primitive, data_type);
        self
    }

    pub fn unit(mut self, units: &str, unit: Unit) -> Self {
        self.units.insert(units.to_lowercase(), unit);
        self
    }

    pub fn build(self) -> LookupTables {
        LookupTables {
            labels: self.labels,
            data_types: self.data_types,
            units: self.units,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_match_is_exact() {
        let tables = LookupTables::default();
        assert_eq!(tables.point_kind("Switch"), Some(PointKind::OnOffSwitch));
        assert_eq!(tables.point_kind("Relative Humidity"), Some(PointKind::Humidity));
        assert_eq!(tables.point_kind("switch"), None);
        assert_eq!(tables.point_kind("Switch All"), None);
    }

    #[test]
    fn test_unit_resolution_is_case_insensitive_exact() {
        let tables = LookupTables::default();
        assert_eq!(tables.unit("V"), Some(Unit::Volt));
        assert_eq!(tables.unit("v"), Some(Unit::Volt));
        assert_eq!(tables.unit("KWH"), Some(Unit::KWh));
        assert_eq!(tables.unit("Volts"), None);
        assert_eq!(tables.unit(""), None);
    }

    #[test]
    fn test_every_primitive_has_a_data_type() {
        let tables = LookupTables::default();
        for primitive in [
            PrimitiveType::Bool,
            PrimitiveType::Button,
            PrimitiveType::Byte,
            PrimitiveType::Decimal,
            PrimitiveType::Int,
            PrimitiveType::Short,
            PrimitiveType::List,
            PrimitiveType::Raw,
            PrimitiveType::String,
        ] {
            assert!(tables.data_type(primitive).is_some(), "{primitive} unmapped");
        }
        assert_eq!(tables.data_type(PrimitiveType::List), Some(DataType::Enum));
    }

    #[test]
    fn test_custom_tables() {
        let tables = LookupTables::builder()
            .label("Water", PointKind::Motion)
            .build();
        assert_eq!(tables.point_kind("Water"), Some(PointKind::Motion));
        assert_eq!(tables.point_kind("Switch"), None);
        assert_eq!(tables.unit("V"), None);
    }
}
