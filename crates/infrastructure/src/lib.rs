//! Infrastructure layer - External integrations
//!
//! Configuration loading, controller drivers, the in-memory device
//! registry and the MQTT surface.

pub mod config;
pub mod drivers;
pub mod messaging;
pub mod registry;

pub use drivers::{ControllerFactory, SimulatedController};
pub use messaging::mqtt_client::{MqttClient, MqttMessage};
pub use messaging::mqtt_publisher::MqttEventPublisher;
pub use registry::InMemoryRegistry;
