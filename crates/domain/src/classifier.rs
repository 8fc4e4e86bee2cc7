use serde::{Deserialize, Serialize};

use crate::lookup::LookupTables;
use crate::registry::PointKind;
use crate::transport::{Genre, TransportValue};

/// Device model category a transport value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueCategory {
    /// Sensor reading or actuator state
    Output(PointKind),
    /// Descriptive metadata of the device
    Attribute,
    /// Device setting
    Configuration,
}

/// Decides the category of a value.
///
/// A label listed in the output table always wins, whatever the genre or
/// writability. Only unlisted labels fall back to the genre.
pub fn classify(value: &TransportValue, tables: &LookupTables) -> ValueCategory {
    if let Some(kind) = tables.point_kind(&value.label) {
        return ValueCategory::Output(kind);
    }
    match value.genre {
        Genre::User => ValueCategory::Attribute,
        Genre::Config => ValueCategory::Configuration,
        Genre::System if value.is_writable() => ValueCategory::Configuration,
        Genre::System => ValueCategory::Attribute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{PrimitiveType, ValueId};

    fn value(label: &str, genre: Genre, read_only: bool) -> TransportValue {
        TransportValue {
            id: ValueId(1),
            home_id: 1,
            node_id: 5,
            primitive: PrimitiveType::Decimal,
            genre,
            label: label.to_string(),
            units: String::new(),
            help: String::new(),
            read_only,
            instance: 1,
            index: 0,
            value: String::new(),
            choices: vec![],
        }
    }

    #[test]
    fn test_listed_label_wins_over_genre() {
        let tables = LookupTables::default();
        for genre in [Genre::User, Genre::Config, Genre::System] {
            for read_only in [true, false] {
                assert_eq!(
                    classify(&value("Temperature", genre, read_only), &tables),
                    ValueCategory::Output(PointKind::Temperature)
                );
            }
        }
    }

    #[test]
    fn test_user_genre_is_attribute() {
        let tables = LookupTables::default();
        assert_eq!(
            classify(&value("Alarm Type", Genre::User, false), &tables),
            ValueCategory::Attribute
        );
    }

    #[test]
    fn test_config_genre_is_configuration() {
        let tables = LookupTables::default();
        assert_eq!(
            classify(&value("MyCustomParam", Genre::Config, false), &tables),
            ValueCategory::Configuration
        );
        assert_eq!(
            classify(&value("Firmware Param", Genre::Config, true), &tables),
            ValueCategory::Configuration
        );
    }

    #[test]
    fn test_system_genre_depends_on_writability() {
        let tables = LookupTables::default();
        assert_eq!(
            classify(&value("Wake-up Interval", Genre::System, false), &tables),
            ValueCategory::Configuration
        );
        assert_eq!(
            classify(&value("Library Version", Genre::System, true), &tables),
            ValueCategory::Attribute
        );
    }
}
