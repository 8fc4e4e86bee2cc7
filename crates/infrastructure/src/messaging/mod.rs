pub mod mqtt_client;
pub mod mqtt_publisher;

pub use mqtt_client::{MqttClient, MqttCommandClient, MqttMessage, MqttPublisherClient};
pub use mqtt_publisher::MqttEventPublisher;
