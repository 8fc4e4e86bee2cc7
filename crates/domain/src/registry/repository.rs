use async_trait::async_trait;
use std::collections::BTreeMap;

use super::device::{ConfigEntry, LogicalDevice};
use super::point::{InputId, InputPoint, OutputId, OutputPoint, PointKind};
use crate::DomainError;
use crate::lifecycle::RunState;

/// Logical device registry.
///
/// The registry owns devices and their points; the bridge only mutates
/// it through this interface. Implementations live in the infrastructure layer.
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    async fn get_device(&self, address: &str) -> Result<Option<LogicalDevice>, DomainError>;

    /// Returns the existing device or creates a new one
    async fn create_device(&self, address: &str) -> Result<LogicalDevice, DomainError>;

    /// Returns false when the device did not exist
    async fn delete_device(&self, address: &str) -> Result<bool, DomainError>;

    /// Merge attributes into the device
    async fn update_attributes(
        &self,
        address: &str,
        attributes: BTreeMap<String, String>,
    ) -> Result<(), DomainError>;

    async fn update_status(
        &self,
        address: &str,
        run_state: RunState,
        last_error: Option<String>,
    ) -> Result<(), DomainError>;

    /// Create or replace the named configuration entry
    async fn update_config_entry(
        &self,
        address: &str,
        name: &str,
        entry: ConfigEntry,
    ) -> Result<(), DomainError>;

    async fn update_config_values(
        &self,
        address: &str,
        values: BTreeMap<String, String>,
    ) -> Result<(), DomainError>;

    async fn get_output(
        &self,
        address: &str,
        kind: PointKind,
        instance: &str,
    ) -> Result<Option<OutputPoint>, DomainError>;

    /// Returns the existing output or creates a new one
    async fn create_output(
        &self,
        address: &str,
        kind: PointKind,
        instance: &str,
    ) -> Result<OutputPoint, DomainError>;

    async fn update_output(&self, output: OutputPoint) -> Result<(), DomainError>;

    async fn get_output_by_id(&self, id: &OutputId) -> Result<Option<OutputPoint>, DomainError>;

    async fn update_output_value(&self, id: &OutputId, value: String) -> Result<(), DomainError>;

    async fn get_input(
        &self,
        address: &str,
        kind: PointKind,
        instance: &str,
    ) -> Result<Option<InputPoint>, DomainError>;

    /// Returns the existing input or creates a new one
    async fn create_input(
        &self,
        address: &str,
        kind: PointKind,
        instance: &str,
    ) -> Result<InputPoint, DomainError>;

    async fn update_input(&self, input: InputPoint) -> Result<(), DomainError>;

    async fn get_input_by_id(&self, id: &InputId) -> Result<Option<InputPoint>, DomainError>;
}
