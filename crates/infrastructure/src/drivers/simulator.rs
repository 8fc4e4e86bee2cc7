use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use domain::DomainError;
use domain::transport::{
    ControllerDriver, ControllerInfo, NetworkCommand, NodeInfo, Notification, NotificationCode,
    NotificationKind, TransportValue, TypedValue, ValueId,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{ControllerConfig, SimulatedNode, WaveConfig};

struct SimValue {
    value: TransportValue,
    wave: Option<WaveConfig>,
}

struct SimNode {
    info: NodeInfo,
    groups: Vec<String>,
}

/// Controller driver that replays a configured inventory instead of talking
/// to a radio.
///
/// `connect` emits the notifications a real controller would send during
/// startup. Writes are confirmed with a `ValueChanged` notification and
/// values with a wave configuration produce periodic readings.
pub struct SimulatedController {
    home_id: u32,
    controller_node_id: u8,
    enable_sis: bool,
    update_interval: Duration,
    nodes: DashMap<u8, SimNode>,
    values: Arc<DashMap<ValueId, SimValue>>,
    /// Replay order of values per node
    value_order: Vec<(u8, ValueId)>,
    tx: mpsc::UnboundedSender<Notification>,
    alive: AtomicBool,
    cancel: std::sync::Mutex<CancellationToken>,
}

impl SimulatedController {
    pub fn new(config: &ControllerConfig) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let nodes = DashMap::new();
        let values = DashMap::new();
        let mut value_order = Vec::new();

        nodes.insert(
            config.controller_node_id,
            SimNode {
                info: controller_node_info(),
                groups: Vec::new(),
            },
        );

        for SimulatedNode {
            node_id,
            info,
            groups,
            values: node_values,
        } in &config.nodes
        {
            nodes.insert(
                *node_id,
                SimNode {
                    info: info.clone(),
                    groups: groups.clone(),
                },
            );
            for v in node_values {
                let id = ValueId(v.id);
                let value = TransportValue {
                    id,
                    home_id: config.home_id,
                    node_id: *node_id,
                    primitive: v.primitive,
                    genre: v.genre,
                    label: v.label.clone(),
                    units: v.units.clone(),
                    help: v.help.clone(),
                    read_only: v.read_only,
                    instance: v.instance,
                    index: v.index,
                    value: v.value.clone(),
                    choices: v.choices.clone(),
                };
                if values.insert(id, SimValue { value, wave: v.wave }).is_some() {
                    warn!(value_id = %id, "Duplicate simulated value id, last one wins");
                } else {
                    value_order.push((*node_id, id));
                }
            }
        }

        let controller = Self {
            home_id: config.home_id,
            controller_node_id: config.controller_node_id,
            enable_sis: config.enable_sis,
            update_interval: Duration::from_millis(config.update_interval_ms),
            nodes,
            values: Arc::new(values),
            value_order,
            tx,
            alive: AtomicBool::new(false),
            cancel: std::sync::Mutex::new(CancellationToken::new()),
        };
        (controller, rx)
    }

    /// Marks the controller alive or dead without touching the stream
    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }

    /// Pushes an arbitrary notification into the stream
    pub fn inject(&self, notification: Notification) -> Result<(), DomainError> {
        self.send(notification)
    }

    fn send(&self, notification: Notification) -> Result<(), DomainError> {
        self.tx
            .send(notification)
            .map_err(|_| DomainError::DriverError("notification stream closed".to_string()))
    }

    fn check_home(&self, home_id: u32) -> Result<(), DomainError> {
        if home_id != self.home_id {
            return Err(DomainError::DriverError(format!(
                "unknown home id {:x}",
                home_id
            )));
        }
        Ok(())
    }

    fn check_node(&self, node_id: u8) -> Result<(), DomainError> {
        if !self.nodes.contains_key(&node_id) {
            return Err(DomainError::DriverError(format!("unknown node {}", node_id)));
        }
        Ok(())
    }

    fn node_values(&self, node_id: u8) -> Vec<TransportValue> {
        self.value_order
            .iter()
            .filter(|(node, _)| *node == node_id)
            .filter_map(|(_, id)| self.values.get(id).map(|v| v.value.clone()))
            .collect()
    }

    fn replay(&self) -> Result<(), DomainError> {
        let home = self.home_id;
        self.send(Notification::node(
            NotificationKind::DriverReady,
            home,
            self.controller_node_id,
        ))?;

        let mut node_ids: Vec<u8> = self.nodes.iter().map(|n| *n.key()).collect();
        node_ids.sort_unstable();
        for node_id in node_ids {
            if node_id == self.controller_node_id {
                continue;
            }
            self.send(Notification::node(NotificationKind::NodeAdded, home, node_id))?;
            for value in self.node_values(node_id) {
                self.send(Notification::value(NotificationKind::ValueAdded, value))?;
            }
            self.send(Notification::node(
                NotificationKind::NodeQueriesComplete,
                home,
                node_id,
            ))?;

            let failed = self.nodes.get(&node_id).is_some_and(|n| n.info.failed);
            if failed {
                self.send(
                    Notification::node(NotificationKind::Notification, home, node_id)
                        .with_code(NotificationCode::Dead),
                )?;
            }
        }

        self.send(Notification::node(
            NotificationKind::AllNodesQueried,
            home,
            self.controller_node_id,
        ))
    }

    fn start_waves(&self, cancel: CancellationToken) {
        let has_waves = self.values.iter().any(|v| v.wave.is_some());
        if !has_waves || self.update_interval.is_zero() {
            return;
        }

        let values = self.values.clone();
        let tx = self.tx.clone();
        let period = self.update_interval;
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = timer.tick() => {}
                }

                let since_epoch = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs_f64();

                let mut updates = Vec::new();
                for mut entry in values.iter_mut() {
                    let Some(wave) = entry.wave else { continue };
                    entry.value.value = format!("{:.2}", wave_value(&wave, since_epoch));
                    updates.push(entry.value.clone());
                }
                for value in updates {
                    if tx
                        .send(Notification::value(NotificationKind::ValueChanged, value))
                        .is_err()
                    {
                        debug!("Notification stream closed, stopping simulated readings");
                        return;
                    }
                }
            }
        });
    }
}

/// Sine wave between the configured bounds, rounded to two decimals
fn wave_value(wave: &WaveConfig, elapsed_secs: f64) -> f64 {
    let range = wave.max_value - wave.min_value;
    let midpoint = wave.min_value + range / 2.0;
    let amplitude = range / 2.0;
    let frequency = if wave.period_secs > 0.0 {
        1.0 / wave.period_secs
    } else {
        0.0
    };
    let raw = midpoint + amplitude * (elapsed_secs * frequency * 2.0 * std::f64::consts::PI).sin();
    (raw * 100.0).round() / 100.0
}

fn controller_node_info() -> NodeInfo {
    NodeInfo {
        manufacturer: "Simulated".to_string(),
        product_name: "Simulated Controller".to_string(),
        device_type_name: "Static PC Controller".to_string(),
        node_type: "Static PC Controller".to_string(),
        basic_type: 2,
        generic_type: 2,
        specific_type: 1,
        awake: true,
        routing: true,
        info_received: true,
        max_baud_rate: 40000,
        query_stage: NodeInfo::QUERY_STAGE_COMPLETE.to_string(),
        ..Default::default()
    }
}

fn typed_to_string(value: &TypedValue) -> String {
    match value {
        TypedValue::Bool(b) => b.to_string(),
        TypedValue::Short(n) => n.to_string(),
        TypedValue::Int(n) => n.to_string(),
        TypedValue::Decimal(n) => n.to_string(),
        TypedValue::Byte(n) => n.to_string(),
        TypedValue::String(s) | TypedValue::ListSelection(s) => s.clone(),
    }
}

#[async_trait]
impl ControllerDriver for SimulatedController {
    async fn connect(&self) -> Result<(), DomainError> {
        if self.alive.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!(
            home_id = %format!("{:x}", self.home_id),
            nodes = self.nodes.len(),
            values = self.values.len(),
            "Simulated controller connected"
        );

        let cancel = {
            let mut guard = self.cancel.lock().unwrap_or_else(|e| e.into_inner());
            *guard = CancellationToken::new();
            guard.clone()
        };
        self.replay()?;
        self.start_waves(cancel);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), DomainError> {
        self.alive.store(false, Ordering::SeqCst);
        self.cancel
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cancel();
        info!("Simulated controller disconnected");
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn version(&self) -> String {
        format!("simulator {}", env!("CARGO_PKG_VERSION"))
    }

    async fn node_info(&self, home_id: u32, node_id: u8) -> Result<NodeInfo, DomainError> {
        self.check_home(home_id)?;
        self.nodes
            .get(&node_id)
            .map(|n| n.info.clone())
            .ok_or_else(|| DomainError::DriverError(format!("unknown node {}", node_id)))
    }

    async fn controller_info(&self, home_id: u32) -> Result<ControllerInfo, DomainError> {
        self.check_home(home_id)?;
        Ok(ControllerInfo {
            controller_node_id: self.controller_node_id,
            library_type_name: "Static Controller".to_string(),
            library_version: "Z-Wave 6.07 (simulated)".to_string(),
            is_primary: true,
            is_static_update_controller: self.enable_sis,
            suc_node_id: if self.enable_sis {
                self.controller_node_id
            } else {
                0
            },
        })
    }

    async fn group_labels(&self, home_id: u32, node_id: u8) -> Result<Vec<String>, DomainError> {
        self.check_home(home_id)?;
        self.nodes
            .get(&node_id)
            .map(|n| n.groups.clone())
            .ok_or_else(|| DomainError::DriverError(format!("unknown node {}", node_id)))
    }

    async fn is_value_set(&self, id: ValueId) -> bool {
        self.values
            .get(&id)
            .is_some_and(|v| !v.value.value.is_empty())
    }

    async fn value_as_string(&self, id: ValueId) -> Result<String, DomainError> {
        self.values
            .get(&id)
            .map(|v| v.value.value.clone())
            .ok_or_else(|| DomainError::DriverError(format!("unknown value {}", id)))
    }

    async fn set_value(&self, id: ValueId, value: TypedValue) -> Result<(), DomainError> {
        let confirmed = {
            let mut entry = self
                .values
                .get_mut(&id)
                .ok_or_else(|| DomainError::DriverError(format!("unknown value {}", id)))?;
            if entry.value.read_only {
                return Err(DomainError::DriverError(format!("value {} is read only", id)));
            }
            let text = typed_to_string(&value);
            if let TypedValue::ListSelection(item) = &value {
                if !entry.value.choices.contains(item) {
                    return Err(DomainError::DriverError(format!(
                        "'{}' is not a choice of value {}",
                        item, id
                    )));
                }
            }
            entry.value.value = text;
            entry.value.clone()
        };

        debug!(value_id = %id, value = %confirmed.value, "Simulated write");
        self.send(Notification::value(NotificationKind::ValueChanged, confirmed))
    }

    async fn execute(&self, home_id: u32, command: NetworkCommand) -> Result<(), DomainError> {
        self.check_home(home_id)?;
        info!(command = ?command, "Simulated network command");

        match command {
            NetworkCommand::AddNode { .. }
            | NetworkCommand::RemoveNode
            | NetworkCommand::CancelCommand
            | NetworkCommand::HealNetwork => Ok(()),
            NetworkCommand::RequestNeighborUpdate(node_id) => self.check_node(node_id),
            NetworkCommand::RefreshNodeInfo(node_id) => {
                self.check_node(node_id)?;
                self.send(Notification::node(
                    NotificationKind::NodeProtocolInfo,
                    home_id,
                    node_id,
                ))
            }
            NetworkCommand::RequestNodeValues(node_id) => {
                self.check_node(node_id)?;
                for value in self.node_values(node_id) {
                    self.send(Notification::value(NotificationKind::ValueRefreshed, value))?;
                }
                Ok(())
            }
            NetworkCommand::RemoveFailedNode(node_id) => {
                let failed = self
                    .nodes
                    .get(&node_id)
                    .map(|n| n.info.failed)
                    .ok_or_else(|| DomainError::DriverError(format!("unknown node {}", node_id)))?;
                if !failed {
                    return Err(DomainError::DriverError(format!(
                        "node {} has not failed",
                        node_id
                    )));
                }
                self.nodes.remove(&node_id);
                self.values.retain(|_, v| v.value.node_id != node_id);
                self.send(Notification::node(
                    NotificationKind::NodeRemoved,
                    home_id,
                    node_id,
                ))
            }
        }
    }
}
