use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::value::{TypedValue, ValueId};
use crate::error::DomainError;

/// Node description as reported by the controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeInfo {
    pub manufacturer: String,
    pub product_name: String,
    pub name: String,
    pub location: String,
    /// Human readable device type, e.g. "Binary Power Switch"
    pub device_type_name: String,
    pub device_type: u16,
    /// Node type derived from the generic or basic type
    pub node_type: String,
    pub basic_type: u8,
    pub generic_type: u8,
    pub specific_type: u8,
    pub security_device: bool,
    pub failed: bool,
    pub awake: bool,
    pub beaming: bool,
    pub routing: bool,
    pub frequent_listening: bool,
    pub info_received: bool,
    pub zwave_plus: bool,
    pub plus_type_name: String,
    pub max_baud_rate: u32,
    /// Interview stage, "Complete" once all queries are done
    pub query_stage: String,
}

impl NodeInfo {
    pub const QUERY_STAGE_COMPLETE: &'static str = "Complete";

    pub fn queries_complete(&self) -> bool {
        self.query_stage == Self::QUERY_STAGE_COMPLETE
    }
}

/// Controller level information for one network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerInfo {
    pub controller_node_id: u8,
    pub library_type_name: String,
    pub library_version: String,
    pub is_primary: bool,
    pub is_static_update_controller: bool,
    pub suc_node_id: u8,
}

/// Network management operations the controller can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkCommand {
    /// Start inclusion of a new node
    AddNode { secure: bool },
    /// Start exclusion of a node
    RemoveNode,
    /// Cancel a running inclusion or exclusion
    CancelCommand,
    RemoveFailedNode(u8),
    HealNetwork,
    RefreshNodeInfo(u8),
    RequestNodeValues(u8),
    RequestNeighborUpdate(u8),
}

/// Port to the mesh network controller.
///
/// Notifications are not part of this trait; concrete drivers hand out
/// an ordered channel receiver when they are constructed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ControllerDriver: Send + Sync {
    /// Open the controller and start the notification stream
    async fn connect(&self) -> Result<(), DomainError>;

    async fn disconnect(&self) -> Result<(), DomainError>;

    /// Liveness probe used by the supervisor loop
    async fn is_alive(&self) -> bool;

    /// Version string of the controller library
    fn version(&self) -> String;

    async fn node_info(&self, home_id: u32, node_id: u8) -> Result<NodeInfo, DomainError>;

    async fn controller_info(&self, home_id: u32) -> Result<ControllerInfo, DomainError>;

    /// Labels of the association groups of a node, in group order
    async fn group_labels(&self, home_id: u32, node_id: u8) -> Result<Vec<String>, DomainError>;

    /// False while the value still holds a placeholder
    async fn is_value_set(&self, id: ValueId) -> bool;

    async fn value_as_string(&self, id: ValueId) -> Result<String, DomainError>;

    async fn set_value(&self, id: ValueId, value: TypedValue) -> Result<(), DomainError>;

    async fn execute(&self, home_id: u32, command: NetworkCommand) -> Result<(), DomainError>;
}
