#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use application::{BridgeContext, BridgeOptions};
use domain::registry::{
    ConfigEntry, DeviceRegistry, InputId, InputPoint, LogicalDevice, OutputId, OutputPoint,
    PointKind,
};
use domain::transport::{
    ControllerDriver, ControllerInfo, Genre, NetworkCommand, NodeInfo, PrimitiveType,
    TransportValue, TypedValue, ValueId,
};
use domain::{DomainError, DomainEvent, EventPublisher, LookupTables, RunState};
use infrastructure::InMemoryRegistry;

pub const HOME: u32 = 0x00c0_ffee;

mock! {
    pub Controller {}

    #[async_trait]
    impl ControllerDriver for Controller {
        async fn connect(&self) -> Result<(), DomainError>;
        async fn disconnect(&self) -> Result<(), DomainError>;
        async fn is_alive(&self) -> bool;
        fn version(&self) -> String;
        async fn node_info(&self, home_id: u32, node_id: u8) -> Result<NodeInfo, DomainError>;
        async fn controller_info(&self, home_id: u32) -> Result<ControllerInfo, DomainError>;
        async fn group_labels(&self, home_id: u32, node_id: u8) -> Result<Vec<String>, DomainError>;
        async fn is_value_set(&self, id: ValueId) -> bool;
        async fn value_as_string(&self, id: ValueId) -> Result<String, DomainError>;
        async fn set_value(&self, id: ValueId, value: TypedValue) -> Result<(), DomainError>;
        async fn execute(&self, home_id: u32, command: NetworkCommand) -> Result<(), DomainError>;
    }
}

// Controller double
#[derive(Default)]
pub struct RecordingController {
    pub set_ids: Mutex<HashSet<ValueId>>,
    pub nodes: Mutex<HashMap<u8, NodeInfo>>,
    pub groups: Mutex<HashMap<u8, Vec<String>>>,
    pub writes: Mutex<Vec<(ValueId, TypedValue)>>,
    pub commands: Mutex<Vec<(u32, NetworkCommand)>>,
    pub fail_writes: AtomicBool,
}

impl RecordingController {
    pub fn mark_set(&self, id: u64) {
        self.set_ids.lock().unwrap().insert(ValueId(id));
    }

    pub fn add_node(&self, node_id: u8, info: NodeInfo) {
        self.nodes.lock().unwrap().insert(node_id, info);
    }

    pub fn writes(&self) -> Vec<(ValueId, TypedValue)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<(u32, NetworkCommand)> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl ControllerDriver for RecordingController {
    async fn connect(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        true
    }

    fn version(&self) -> String {
        "1.6-test".to_string()
    }

    async fn node_info(&self, _home_id: u32, node_id: u8) -> Result<NodeInfo, DomainError> {
        Ok(self
            .nodes
            .lock()
            .unwrap()
            .get(&node_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn controller_info(&self, _home_id: u32) -> Result<ControllerInfo, DomainError> {
        Ok(ControllerInfo {
            controller_node_id: 1,
            library_type_name: "Static Controller".to_string(),
            library_version: "Z-Wave 6.07".to_string(),
            is_primary: true,
            is_static_update_controller: true,
            suc_node_id: 1,
        })
    }

    async fn group_labels(&self, _home_id: u32, node_id: u8) -> Result<Vec<String>, DomainError> {
        Ok(self
            .groups
            .lock()
            .unwrap()
            .get(&node_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn is_value_set(&self, id: ValueId) -> bool {
        self.set_ids.lock().unwrap().contains(&id)
    }

    async fn value_as_string(&self, _id: ValueId) -> Result<String, DomainError> {
        Ok(String::new())
    }

    async fn set_value(&self, id: ValueId, value: TypedValue) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::DriverError("radio busy".to_string()));
        }
        self.writes.lock().unwrap().push((id, value));
        Ok(())
    }

    async fn execute(&self, home_id: u32, command: NetworkCommand) -> Result<(), DomainError> {
        self.commands.lock().unwrap().push((home_id, command));
        Ok(())
    }
}

// Registry double: the in-memory registry with a call counter in front
pub struct CountingRegistry {
    inner: InMemoryRegistry,
    calls: AtomicUsize,
    pub events: Arc<RecordingPublisher>,
}

impl CountingRegistry {
    pub fn new() -> Self {
        let events = Arc::new(RecordingPublisher::default());
        Self {
            inner: InMemoryRegistry::new(events.clone()),
            calls: AtomicUsize::new(0),
            events,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &InMemoryRegistry {
        &self.inner
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeviceRegistry for CountingRegistry {
    async fn get_device(&self, address: &str) -> Result<Option<LogicalDevice>, DomainError> {
        self.hit();
        self.inner.get_device(address).await
    }

    async fn create_device(&self, address: &str) -> Result<LogicalDevice, DomainError> {
        self.hit();
        self.inner.create_device(address).await
    }

    async fn delete_device(&self, address: &str) -> Result<bool, DomainError> {
        self.hit();
        self.inner.delete_device(address).await
    }

    async fn update_attributes(
        &self,
        address: &str,
        attributes: BTreeMap<String, String>,
    ) -> Result<(), DomainError> {
        self.hit();
        self.inner.update_attributes(address, attributes).await
    }

    async fn update_status(
        &self,
        address: &str,
        run_state: RunState,
        last_error: Option<String>,
    ) -> Result<(), DomainError> {
        self.hit();
        self.inner.update_status(address, run_state, last_error).await
    }

    async fn update_config_entry(
        &self,
        address: &str,
        name: &str,
        entry: ConfigEntry,
    ) -> Result<(), DomainError> {
        self.hit();
        self.inner.update_config_entry(address, name, entry).await
    }

    async fn update_config_values(
        &self,
        address: &str,
        values: BTreeMap<String, String>,
    ) -> Result<(), DomainError> {
        self.hit();
        self.inner.update_config_values(address, values).await
    }

    async fn get_output(
        &self,
        address: &str,
        kind: PointKind,
        instance: &str,
    ) -> Result<Option<OutputPoint>, DomainError> {
        self.hit();
        self.inner.get_output(address, kind, instance).await
    }

    async fn create_output(
        &self,
        address: &str,
        kind: PointKind,
        instance: &str,
    ) -> Result<OutputPoint, DomainError> {
        self.hit();
        self.inner.create_output(address, kind, instance).await
    }

    async fn update_output(&self, output: OutputPoint) -> Result<(), DomainError> {
        self.hit();
        self.inner.update_output(output).await
    }

    async fn get_output_by_id(&self, id: &OutputId) -> Result<Option<OutputPoint>, DomainError> {
        self.hit();
        self.inner.get_output_by_id(id).await
    }

    async fn update_output_value(&self, id: &OutputId, value: String) -> Result<(), DomainError> {
        self.hit();
        self.inner.update_output_value(id, value).await
    }

    async fn get_input(
        &self,
        address: &str,
        kind: PointKind,
        instance: &str,
    ) -> Result<Option<InputPoint>, DomainError> {
        self.hit();
        self.inner.get_input(address, kind, instance).await
    }

    async fn create_input(
        &self,
        address: &str,
        kind: PointKind,
        instance: &str,
    ) -> Result<InputPoint, DomainError> {
        self.hit();
        self.inner.create_input(address, kind, instance).await
    }

    async fn update_input(&self, input: InputPoint) -> Result<(), DomainError> {
        self.hit();
        self.inner.update_input(input).await
    }

    async fn get_input_by_id(&self, id: &InputId) -> Result<Option<InputPoint>, DomainError> {
        self.hit();
        self.inner.get_input_by_id(id).await
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<DomainEvent>>,
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), DomainError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

pub struct Harness {
    pub controller: Arc<RecordingController>,
    pub registry: Arc<CountingRegistry>,
    pub ctx: Arc<BridgeContext>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(BridgeOptions::default())
    }

    pub fn with_options(options: BridgeOptions) -> Self {
        let controller = Arc::new(RecordingController::default());
        let registry = Arc::new(CountingRegistry::new());
        let ctx = Arc::new(BridgeContext::new(
            controller.clone(),
            registry.clone(),
            LookupTables::default(),
            options,
        ));
        ctx.set_home_id(HOME);
        Self {
            controller,
            registry,
            ctx,
        }
    }

    pub async fn device(&self, address: &str) -> LogicalDevice {
        self.registry
            .inner()
            .get_device(address)
            .await
            .unwrap()
            .expect("device exists")
    }
}

/// A writable value on instance 1
pub fn value(id: u64, node_id: u8, label: &str, primitive: PrimitiveType, genre: Genre) -> TransportValue {
    TransportValue {
        id: ValueId(id),
        home_id: HOME,
        node_id,
        primitive,
        genre,
        label: label.to_string(),
        units: String::new(),
        help: String::new(),
        read_only: false,
        instance: 1,
        index: 0,
        value: String::new(),
        choices: Vec::new(),
    }
}
