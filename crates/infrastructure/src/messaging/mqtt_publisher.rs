use crate::messaging::mqtt_client::MqttPublisherClient;
use async_trait::async_trait;
use domain::event::EventPublisher;
use domain::{DomainError, DomainEvent};
use rumqttc::QoS;
use serde_json::json;
use std::sync::Arc;

/// One outgoing MQTT message
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

/// Publishes registry events under `zwave/{agent_id}`.
///
/// Descriptions (nodes, attributes, status, configuration, point discovery)
/// are retained; output values are not. A removed device clears its
/// retained node message with an empty payload.
pub struct MqttEventPublisher {
    client: Arc<dyn MqttPublisherClient>,
    prefix: String,
}

impl MqttEventPublisher {
    pub fn new(client: Arc<dyn MqttPublisherClient>, agent_id: &str) -> Self {
        Self {
            client,
            prefix: format!("zwave/{}", agent_id),
        }
    }

    pub fn encode(&self, event: &DomainEvent) -> Outgoing {
        let p = &self.prefix;
        let ts = event.timestamp().timestamp_millis();
        let (topic, payload, retain) = match event {
            DomainEvent::DeviceDiscovered { address, .. } => (
                format!("{}/node/{}", p, address),
                json!({ "address": address, "ts": ts }).to_string(),
                true,
            ),
            DomainEvent::DeviceRemoved { address, .. } => {
                (format!("{}/node/{}", p, address), String::new(), true)
            }
            DomainEvent::DeviceAttributesUpdated {
                address,
                attributes,
                ..
            } => (
                format!("{}/node/{}/attr", p, address),
                json!(attributes).to_string(),
                true,
            ),
            DomainEvent::DeviceStatusChanged {
                address,
                run_state,
                last_error,
                ..
            } => (
                format!("{}/node/{}/status", p, address),
                json!({ "state": run_state, "error": last_error, "ts": ts }).to_string(),
                true,
            ),
            DomainEvent::ConfigurationUpdated {
                address, config, ..
            } => (
                format!("{}/node/{}/config", p, address),
                json!(config).to_string(),
                true,
            ),
            DomainEvent::OutputDiscovered { output, .. } => (
                format!("{}/output/{}", p, output.id),
                json!({
                    "kind": output.kind,
                    "instance": output.instance,
                    "data_type": output.data_type,
                    "unit": output.unit,
                })
                .to_string(),
                true,
            ),
            DomainEvent::OutputValueUpdated {
                output_id, value, ..
            } => (
                format!("{}/output/{}/value", p, output_id),
                json!({ "val": value, "ts": ts }).to_string(),
                false,
            ),
            DomainEvent::InputDiscovered { input, .. } => (
                format!("{}/input/{}", p, input.id),
                json!({
                    "kind": input.kind,
                    "instance": input.instance,
                    "data_type": input.data_type,
                    "unit": input.unit,
                    "description": input.description,
                })
                .to_string(),
                true,
            ),
        };
        Outgoing {
            topic,
            payload,
            retain,
        }
    }
}

#[async_trait]
impl EventPublisher for MqttEventPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), DomainError> {
        let out = self.encode(&event);
        if let Err(e) = self
            .client
            .publish_bytes(
                &out.topic,
                out.payload.as_bytes(),
                QoS::AtLeastOnce,
                out.retain,
            )
            .await
        {
            tracing::error!(topic = %out.topic, error = %e, "Failed to publish MQTT message");
        }
        Ok(())
    }
}
