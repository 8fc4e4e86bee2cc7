//! Transport side of the bridge: what the mesh controller reports and accepts.

mod controller;
mod notification;
mod value;

pub use controller::{ControllerDriver, ControllerInfo, NetworkCommand, NodeInfo};
pub use notification::{Notification, NotificationCode, NotificationKind};
pub use value::{Genre, PrimitiveType, TransportValue, TypedValue, ValueId};
