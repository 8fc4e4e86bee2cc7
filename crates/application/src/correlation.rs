use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use domain::transport::PrimitiveType;
use domain::{InputId, OutputId, ValueId};
use tracing::warn;

/// Transport value a logical write goes to, with the type it expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueBinding {
    pub id: ValueId,
    pub primitive: PrimitiveType,
}

/// Device attribute a transport value feeds
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeRef {
    pub address: String,
    pub name: String,
}

/// Point-in-time copy of every correlation, ordered for comparison
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationSnapshot {
    pub outputs: BTreeMap<ValueId, OutputId>,
    pub attributes: BTreeMap<ValueId, AttributeRef>,
    pub inputs: BTreeMap<InputId, ValueId>,
    pub inputs_by_value: BTreeMap<ValueId, InputId>,
    pub config_values: BTreeMap<AttributeRef, ValueId>,
}

impl CorrelationSnapshot {
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
            && self.attributes.is_empty()
            && self.inputs.is_empty()
            && self.inputs_by_value.is_empty()
            && self.config_values.is_empty()
    }
}

#[derive(Default)]
struct Tables {
    outputs: HashMap<ValueId, OutputId>,
    attributes: HashMap<ValueId, AttributeRef>,
    inputs: HashMap<InputId, ValueBinding>,
    inputs_by_value: HashMap<ValueId, InputId>,
    config_values: HashMap<AttributeRef, ValueBinding>,
}

/// Mapping between controller value ids and registry identifiers.
///
/// Shared by the notification loop and the command path. Every operation
/// takes the lock for its own duration only, so each one is atomic.
/// An id registered as an output can never become an attribute, and the
/// other way around.
#[derive(Default)]
pub struct CorrelationStore {
    tables: Mutex<Tables>,
}

impl CorrelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns false when the id is already an attribute
    pub fn register_output(&self, id: ValueId, output_id: OutputId) -> bool {
        let mut tables = self.lock();
        if let Some(attr) = tables.attributes.get(&id) {
            warn!(
                value_id = %id,
                output = %output_id,
                attribute = %attr.name,
                "Value already correlated as attribute, output registration rejected"
            );
            return false;
        }
        tables.outputs.insert(id, output_id);
        true
    }

    /// Returns false when the id is already an output
    pub fn register_attribute(&self, id: ValueId, address: &str, name: &str) -> bool {
        let mut tables = self.lock();
        if let Some(output_id) = tables.outputs.get(&id) {
            warn!(
                value_id = %id,
                output = %output_id,
                attribute = %name,
                "Value already correlated as output, attribute registration rejected"
            );
            return false;
        }
        tables.attributes.insert(
            id,
            AttributeRef {
                address: address.to_string(),
                name: name.to_string(),
            },
        );
        true
    }

    /// Sets both directions in one step
    pub fn register_input(&self, id: ValueId, input_id: InputId, primitive: PrimitiveType) {
        let mut tables = self.lock();
        tables
            .inputs
            .insert(input_id.clone(), ValueBinding { id, primitive });
        tables.inputs_by_value.insert(id, input_id);
    }

    pub fn register_config_value(&self, address: &str, name: &str, binding: ValueBinding) {
        let key = AttributeRef {
            address: address.to_string(),
            name: name.to_string(),
        };
        self.lock().config_values.insert(key, binding);
    }

    pub fn lookup_output(&self, id: ValueId) -> Option<OutputId> {
        self.lock().outputs.get(&id).cloned()
    }

    pub fn lookup_attribute(&self, id: ValueId) -> Option<AttributeRef> {
        self.lock().attributes.get(&id).cloned()
    }

    pub fn lookup_input(&self, input_id: &InputId) -> Option<ValueBinding> {
        self.lock().inputs.get(input_id).copied()
    }

    pub fn lookup_input_for_value(&self, id: ValueId) -> Option<InputId> {
        self.lock().inputs_by_value.get(&id).cloned()
    }

    pub fn lookup_config_value(&self, address: &str, name: &str) -> Option<ValueBinding> {
        let key = AttributeRef {
            address: address.to_string(),
            name: name.to_string(),
        };
        self.lock().config_values.get(&key).copied()
    }

    /// Drops every correlation of a device. Returns the number of entries removed.
    pub fn purge_device(&self, address: &str) -> usize {
        let mut tables = self.lock();
        let before = tables.len();

        tables.outputs.retain(|_, output| output.address() != address);
        tables.attributes.retain(|_, attr| attr.address != address);
        tables.inputs.retain(|input, _| input.address() != address);
        tables
            .inputs_by_value
            .retain(|_, input| input.address() != address);
        tables.config_values.retain(|key, _| key.address != address);

        before - tables.len()
    }

    pub fn snapshot(&self) -> CorrelationSnapshot {
        let tables = self.lock();
        CorrelationSnapshot {
            outputs: tables
                .outputs
                .iter()
                .map(|(id, output)| (*id, output.clone()))
                .collect(),
            attributes: tables
                .attributes
                .iter()
                .map(|(id, attr)| (*id, attr.clone()))
                .collect(),
            inputs: tables
                .inputs
                .iter()
                .map(|(input, binding)| (input.clone(), binding.id))
                .collect(),
            inputs_by_value: tables
                .inputs_by_value
                .iter()
                .map(|(id, input)| (*id, input.clone()))
                .collect(),
            config_values: tables
                .config_values
                .iter()
                .map(|(key, binding)| (key.clone(), binding.id))
                .collect(),
        }
    }
}

impl Tables {
    fn len(&self) -> usize {
        self.outputs.len()
            + self.attributes.len()
            + self.inputs.len()
            + self.inputs_by_value.len()
            + self.config_values.len()
    }
}
