use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use domain::{ControllerDriver, DeviceRegistry, LookupTables};

use crate::correlation::CorrelationStore;

/// Behaviour switches of the bridge
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    /// Publish low level Z-Wave details as device attributes
    pub include_zw_info: bool,
    /// Value labels whose notifications are dropped
    pub ignore_labels: Vec<String>,
    /// Name published for the controller device
    pub controller_name: String,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            include_zw_info: false,
            ignore_labels: ["Exporting", "Color", "Previous Reading", "Interval"]
                .into_iter()
                .map(String::from)
                .collect(),
            controller_name: "Z-Wave controller".to_string(),
        }
    }
}

/// Collaborators shared by the notification path and the command path
pub struct BridgeContext {
    pub controller: Arc<dyn ControllerDriver>,
    pub registry: Arc<dyn DeviceRegistry>,
    pub correlations: CorrelationStore,
    pub tables: LookupTables,
    pub options: BridgeOptions,
    home_id: AtomicU32,
}

impl BridgeContext {
    pub fn new(
        controller: Arc<dyn ControllerDriver>,
        registry: Arc<dyn DeviceRegistry>,
        tables: LookupTables,
        options: BridgeOptions,
    ) -> Self {
        Self {
            controller,
            registry,
            correlations: CorrelationStore::new(),
            tables,
            options,
            home_id: AtomicU32::new(0),
        }
    }

    /// Network id learned from the last controller discovery
    pub fn home_id(&self) -> u32 {
        self.home_id.load(Ordering::Acquire)
    }

    pub fn set_home_id(&self, home_id: u32) {
        self.home_id.store(home_id, Ordering::Release);
    }
}
