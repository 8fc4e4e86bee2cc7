use serde::{Deserialize, Serialize};
use std::fmt;

use super::value::TransportValue;

/// Type tag of a controller notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    ValueAdded,
    ValueRemoved,
    ValueChanged,
    ValueRefreshed,
    Group,
    NodeNew,
    NodeAdded,
    NodeRemoved,
    NodeProtocolInfo,
    NodeNaming,
    NodeEvent,
    PollingDisabled,
    PollingEnabled,
    SceneEvent,
    CreateButton,
    DeleteButton,
    ButtonOn,
    ButtonOff,
    DriverReady,
    DriverFailed,
    DriverReset,
    EssentialNodeQueriesComplete,
    NodeQueriesComplete,
    AwakeNodesQueried,
    AllNodesQueriedSomeDead,
    AllNodesQueried,
    Notification,
    DriverRemoved,
    ControllerCommand,
    NodeReset,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 30] = [
        Self::ValueAdded,
        Self::ValueRemoved,
        Self::ValueChanged,
        Self::ValueRefreshed,
        Self::Group,
        Self::NodeNew,
        Self::NodeAdded,
        Self::NodeRemoved,
        Self::NodeProtocolInfo,
        Self::NodeNaming,
        Self::NodeEvent,
        Self::PollingDisabled,
        Self::PollingEnabled,
        Self::SceneEvent,
        Self::CreateButton,
        Self::DeleteButton,
        Self::ButtonOn,
        Self::ButtonOff,
        Self::DriverReady,
        Self::DriverFailed,
        Self::DriverReset,
        Self::EssentialNodeQueriesComplete,
        Self::NodeQueriesComplete,
        Self::AwakeNodesQueried,
        Self::AllNodesQueriedSomeDead,
        Self::AllNodesQueried,
        Self::Notification,
        Self::DriverRemoved,
        Self::ControllerCommand,
        Self::NodeReset,
    ];
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Numeric code carried by `Notification` and `ControllerCommand` notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationCode {
    MsgComplete,
    Timeout,
    NoOperation,
    Awake,
    Sleep,
    Dead,
    Alive,
}

impl NotificationCode {
    pub fn from_raw(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::MsgComplete),
            1 => Some(Self::Timeout),
            2 => Some(Self::NoOperation),
            3 => Some(Self::Awake),
            4 => Some(Self::Sleep),
            5 => Some(Self::Dead),
            6 => Some(Self::Alive),
            _ => None,
        }
    }
}

/// One event from the controller's notification stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub home_id: u32,
    pub node_id: u8,
    #[serde(default)]
    pub value: Option<TransportValue>,
    #[serde(default)]
    pub code: Option<NotificationCode>,
}

impl Notification {
    pub fn node(kind: NotificationKind, home_id: u32, node_id: u8) -> Self {
        Self {
            kind,
            home_id,
            node_id,
            value: None,
            code: None,
        }
    }

    pub fn value(kind: NotificationKind, value: TransportValue) -> Self {
        Self {
            kind,
            home_id: value.home_id,
            node_id: value.node_id,
            value: Some(value),
            code: None,
        }
    }

    pub fn with_code(mut self, code: NotificationCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Label of the carried value, if any
    pub fn label(&self) -> Option<&str> {
        self.value.as_ref().map(|v| v.label.as_str())
    }
}
