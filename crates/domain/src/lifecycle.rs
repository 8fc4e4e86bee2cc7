use serde::{Deserialize, Serialize};
use std::fmt;

use crate::transport::{NodeInfo, NotificationCode};

/// Run state of a logical device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Never heard from
    #[default]
    Unknown,
    /// Interview with the controller still in progress
    Discovering,
    /// Fully interviewed and reachable
    Ready,
    /// Failed or timed out
    Error,
    /// Reported dead by the controller
    Lost,
    /// Battery device in its sleep cycle
    Sleeping,
}

impl RunState {
    /// Transition driven by a controller notification code.
    ///
    /// Transitions are re-entrant: the target does not depend on the current state.
    /// Returns `None` for codes that carry no state change.
    pub fn on_notification(code: NotificationCode) -> Option<Self> {
        match code {
            NotificationCode::Timeout => Some(Self::Error),
            NotificationCode::Dead => Some(Self::Lost),
            NotificationCode::Sleep => Some(Self::Sleeping),
            NotificationCode::Awake | NotificationCode::Alive => Some(Self::Ready),
            NotificationCode::MsgComplete | NotificationCode::NoOperation => None,
        }
    }

    /// State derived from a node interview snapshot
    pub fn from_node_info(info: &NodeInfo) -> Self {
        if info.failed {
            Self::Error
        } else if !info.awake {
            Self::Sleeping
        } else if info.queries_complete() {
            Self::Ready
        } else {
            Self::Discovering
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Discovering => "discovering",
            Self::Ready => "ready",
            Self::Error => "error",
            Self::Lost => "lost",
            Self::Sleeping => "sleeping",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
