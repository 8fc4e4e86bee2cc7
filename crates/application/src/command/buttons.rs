use domain::DomainError;
use domain::transport::{NetworkCommand, PrimitiveType, TypedValue};

/// Push buttons the controller device exposes for network management
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerButton {
    AddNode,
    HealNetwork,
    RemoveFailedNode,
    RemoveNode,
    RefreshNodeInfo,
    RequestNodeValues,
    UpdateNeighbors,
}

impl ControllerButton {
    pub const ALL: [ControllerButton; 7] = [
        Self::AddNode,
        Self::HealNetwork,
        Self::RemoveFailedNode,
        Self::RemoveNode,
        Self::RefreshNodeInfo,
        Self::RequestNodeValues,
        Self::UpdateNeighbors,
    ];

    /// Input instance name of the button
    pub fn instance(&self) -> &'static str {
        match self {
            Self::AddNode => "addnode",
            Self::HealNetwork => "healnetwork",
            Self::RemoveFailedNode => "removefailednode",
            Self::RemoveNode => "removenode",
            Self::RefreshNodeInfo => "refreshnodeinfo",
            Self::RequestNodeValues => "requestnodevalue",
            Self::UpdateNeighbors => "updateneighbors",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::AddNode => "Start the controller inclusion process to add a node",
            Self::HealNetwork => "Start the controller heal network process",
            Self::RemoveFailedNode => "Remove failed nodes",
            Self::RemoveNode => "Start the controller exclusion process to remove a node",
            Self::RefreshNodeInfo => {
                "Refresh the node information. Use when node information is incomplete."
            }
            Self::RequestNodeValues => "Refresh the node sensor value(s)",
            Self::UpdateNeighbors => {
                "Request the node to update its neighbors. Use after network changes."
            }
        }
    }

    pub fn from_instance(instance: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.instance() == instance)
    }

    /// Network command for a button press.
    ///
    /// Inclusion and exclusion take a start/stop flag, where stop cancels the
    /// running controller command. Node commands take the target node id.
    pub fn command(&self, payload: &str) -> Result<NetworkCommand, DomainError> {
        let command = match self {
            Self::AddNode => match start_stop(payload)? {
                true => NetworkCommand::AddNode { secure: true },
                false => NetworkCommand::CancelCommand,
            },
            Self::RemoveNode => match start_stop(payload)? {
                true => NetworkCommand::RemoveNode,
                false => NetworkCommand::CancelCommand,
            },
            Self::HealNetwork => NetworkCommand::HealNetwork,
            Self::RemoveFailedNode => NetworkCommand::RemoveFailedNode(target_node(payload)?),
            Self::RefreshNodeInfo => NetworkCommand::RefreshNodeInfo(target_node(payload)?),
            Self::RequestNodeValues => NetworkCommand::RequestNodeValues(target_node(payload)?),
            Self::UpdateNeighbors => NetworkCommand::RequestNeighborUpdate(target_node(payload)?),
        };
        Ok(command)
    }
}

fn start_stop(payload: &str) -> Result<bool, DomainError> {
    TypedValue::parse_flag(payload)
}

fn target_node(payload: &str) -> Result<u8, DomainError> {
    payload
        .trim()
        .parse::<u8>()
        .map_err(|e| DomainError::InvalidPayload {
            payload: payload.to_string(),
            primitive: PrimitiveType::Byte,
            reason: format!("expected a node id: {e}"),
        })
}
