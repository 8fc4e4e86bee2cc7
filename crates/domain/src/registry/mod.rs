mod device;
mod point;
mod repository;

pub use device::{
    ATTR_DESCRIPTION, ATTR_LOCATION_NAME, ATTR_MANUFACTURER, ATTR_MODEL, ATTR_NAME,
    ATTR_SECURITY_NODE, ATTR_SOFTWARE_VERSION, ATTR_TYPE, ConfigEntry, DeviceStatus,
    LogicalDevice,
};
pub use point::{DataType, InputId, InputPoint, OutputId, OutputPoint, PointKind, Unit};
pub use repository::DeviceRegistry;
