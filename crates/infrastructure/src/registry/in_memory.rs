use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use domain::registry::{
    ConfigEntry, DeviceRegistry, InputId, InputPoint, LogicalDevice, OutputId, OutputPoint,
    PointKind,
};
use domain::{DomainError, DomainEvent, EventPublisher, RunState};
use tracing::{debug, warn};

/// Device registry kept in memory.
///
/// Every change is forwarded to the event publisher; unchanged writes are
/// not republished. Map guards are always released before publishing.
pub struct InMemoryRegistry {
    devices: DashMap<String, LogicalDevice>,
    outputs: DashMap<OutputId, OutputPoint>,
    inputs: DashMap<InputId, InputPoint>,
    publisher: Arc<dyn EventPublisher>,
}

impl InMemoryRegistry {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            devices: DashMap::new(),
            outputs: DashMap::new(),
            inputs: DashMap::new(),
            publisher,
        }
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Outputs of one device, ordered by id
    pub fn outputs_of(&self, address: &str) -> Vec<OutputPoint> {
        let mut outputs: Vec<OutputPoint> = self
            .outputs
            .iter()
            .filter(|o| o.address == address)
            .map(|o| o.value().clone())
            .collect();
        outputs.sort_by(|a, b| a.id.cmp(&b.id));
        outputs
    }

    /// Inputs of one device, ordered by id
    pub fn inputs_of(&self, address: &str) -> Vec<InputPoint> {
        let mut inputs: Vec<InputPoint> = self
            .inputs
            .iter()
            .filter(|i| i.address == address)
            .map(|i| i.value().clone())
            .collect();
        inputs.sort_by(|a, b| a.id.cmp(&b.id));
        inputs
    }

    async fn emit(&self, event: Option<DomainEvent>) {
        let Some(event) = event else { return };
        let event_type = event.event_type().to_string();
        if let Err(e) = self.publisher.publish(event).await {
            warn!(event = %event_type, error = %e, "Failed to publish registry event");
        }
    }

    fn require_device(&self, address: &str) -> Result<(), DomainError> {
        if self.devices.contains_key(address) {
            Ok(())
        } else {
            Err(DomainError::UnknownDevice(address.to_string()))
        }
    }
}

#[async_trait]
impl DeviceRegistry for InMemoryRegistry {
    async fn get_device(&self, address: &str) -> Result<Option<LogicalDevice>, DomainError> {
        Ok(self.devices.get(address).map(|d| d.value().clone()))
    }

    async fn create_device(&self, address: &str) -> Result<LogicalDevice, DomainError> {
        let (device, created) = match self.devices.entry(address.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(e) => (e.get().clone(), false),
            dashmap::mapref::entry::Entry::Vacant(e) => {
                let device = LogicalDevice::new(address);
                e.insert(device.clone());
                (device, true)
            }
        };
        if created {
            debug!(device = %address, "Device created");
            self.emit(Some(DomainEvent::device_discovered(address))).await;
        }
        Ok(device)
    }

    async fn delete_device(&self, address: &str) -> Result<bool, DomainError> {
        let existed = self.devices.remove(address).is_some();
        self.outputs.retain(|_, o| o.address != address);
        self.inputs.retain(|_, i| i.address != address);
        if existed {
            self.emit(Some(DomainEvent::device_removed(address))).await;
        }
        Ok(existed)
    }

    async fn update_attributes(
        &self,
        address: &str,
        attributes: BTreeMap<String, String>,
    ) -> Result<(), DomainError> {
        let event = {
            let mut device = self
                .devices
                .get_mut(address)
                .ok_or_else(|| DomainError::UnknownDevice(address.to_string()))?;
            let changed = attributes
                .iter()
                .any(|(name, value)| device.attributes.get(name) != Some(value));
            if changed {
                device.attributes.extend(attributes);
                Some(DomainEvent::device_attributes_updated(
                    address,
                    device.attributes.clone(),
                ))
            } else {
                None
            }
        };
        self.emit(event).await;
        Ok(())
    }

    async fn update_status(
        &self,
        address: &str,
        run_state: RunState,
        last_error: Option<String>,
    ) -> Result<(), DomainError> {
        let event = {
            let mut device = self
                .devices
                .get_mut(address)
                .ok_or_else(|| DomainError::UnknownDevice(address.to_string()))?;
            let changed =
                device.status.run_state != run_state || device.status.last_error != last_error;
            device.set_status(run_state, last_error.clone());
            changed.then(|| DomainEvent::device_status_changed(address, run_state, last_error))
        };
        self.emit(event).await;
        Ok(())
    }

    async fn update_config_entry(
        &self,
        address: &str,
        name: &str,
        entry: ConfigEntry,
    ) -> Result<(), DomainError> {
        let event = {
            let mut device = self
                .devices
                .get_mut(address)
                .ok_or_else(|| DomainError::UnknownDevice(address.to_string()))?;
            if device.config.get(name) == Some(&entry) {
                None
            } else {
                device.config.insert(name.to_string(), entry);
                Some(DomainEvent::configuration_updated(
                    address,
                    device.config.clone(),
                ))
            }
        };
        self.emit(event).await;
        Ok(())
    }

    async fn update_config_values(
        &self,
        address: &str,
        values: BTreeMap<String, String>,
    ) -> Result<(), DomainError> {
        let event = {
            let mut device = self
                .devices
                .get_mut(address)
                .ok_or_else(|| DomainError::UnknownDevice(address.to_string()))?;
            let before = device.config.clone();
            device.apply_config_values(&values);
            (device.config != before)
                .then(|| DomainEvent::configuration_updated(address, device.config.clone()))
        };
        self.emit(event).await;
        Ok(())
    }

    async fn get_output(
        &self,
        address: &str,
        kind: PointKind,
        instance: &str,
    ) -> Result<Option<OutputPoint>, DomainError> {
        self.get_output_by_id(&OutputId::new(address, kind, instance))
            .await
    }

    async fn create_output(
        &self,
        address: &str,
        kind: PointKind,
        instance: &str,
    ) -> Result<OutputPoint, DomainError> {
        self.require_device(address)?;
        let id = OutputId::new(address, kind, instance);
        let (output, created) = match self.outputs.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(e) => (e.get().clone(), false),
            dashmap::mapref::entry::Entry::Vacant(e) => {
                let output = OutputPoint::new(address, kind, instance);
                e.insert(output.clone());
                (output, true)
            }
        };
        if created {
            self.emit(Some(DomainEvent::output_discovered(output.clone())))
                .await;
        }
        Ok(output)
    }

    async fn update_output(&self, output: OutputPoint) -> Result<(), DomainError> {
        if !self.outputs.contains_key(&output.id) {
            return Err(DomainError::Registry(format!("unknown output {}", output.id)));
        }
        self.outputs.insert(output.id.clone(), output.clone());
        self.emit(Some(DomainEvent::output_discovered(output))).await;
        Ok(())
    }

    async fn get_output_by_id(&self, id: &OutputId) -> Result<Option<OutputPoint>, DomainError> {
        Ok(self.outputs.get(id).map(|o| o.value().clone()))
    }

    async fn update_output_value(&self, id: &OutputId, value: String) -> Result<(), DomainError> {
        {
            let mut output = self
                .outputs
                .get_mut(id)
                .ok_or_else(|| DomainError::Registry(format!("unknown output {}", id)))?;
            output.value = Some(value.clone());
            output.updated_at = Some(Utc::now());
        }
        self.emit(Some(DomainEvent::output_value_updated(id.clone(), value)))
            .await;
        Ok(())
    }

    async fn get_input(
        &self,
        address: &str,
        kind: PointKind,
        instance: &str,
    ) -> Result<Option<InputPoint>, DomainError> {
        self.get_input_by_id(&InputId::new(address, kind, instance))
            .await
    }

    async fn create_input(
        &self,
        address: &str,
        kind: PointKind,
        instance: &str,
    ) -> Result<InputPoint, DomainError> {
        self.require_device(address)?;
        let id = InputId::new(address, kind, instance);
        let (input, created) = match self.inputs.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(e) => (e.get().clone(), false),
            dashmap::mapref::entry::Entry::Vacant(e) => {
                let input = InputPoint::new(address, kind, instance);
                e.insert(input.clone());
                (input, true)
            }
        };
        if created {
            self.emit(Some(DomainEvent::input_discovered(input.clone())))
                .await;
        }
        Ok(input)
    }

    async fn update_input(&self, input: InputPoint) -> Result<(), DomainError> {
        if !self.inputs.contains_key(&input.id) {
            return Err(DomainError::Registry(format!("unknown input {}", input.id)));
        }
        self.inputs.insert(input.id.clone(), input.clone());
        self.emit(Some(DomainEvent::input_discovered(input))).await;
        Ok(())
    }

    async fn get_input_by_id(&self, id: &InputId) -> Result<Option<InputPoint>, DomainError> {
        Ok(self.inputs.get(id).map(|i| i.value().clone()))
    }
}
