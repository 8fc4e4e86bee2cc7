//! Application layer - Use cases of the Z-Wave bridge
//!
//! The notification path (dispatcher, discovery, router, lifecycle) runs as one
//! consumer; the command path (translator, listener) runs beside it and shares
//! the correlation store.

pub mod command;
pub mod context;
pub mod correlation;
pub mod discovery;
pub mod dispatcher;
pub mod lifecycle;
pub mod liveness;
pub mod messaging;
pub mod router;

pub use command::{CommandTranslator, ConfigReport, ControllerButton};
pub use context::{BridgeContext, BridgeOptions};
pub use correlation::{CorrelationSnapshot, CorrelationStore, ValueBinding};
pub use discovery::DiscoveryPipeline;
pub use dispatcher::{Handler, NotificationDispatcher};
pub use lifecycle::DeviceLifecycleManager;
pub use liveness::LivenessMonitor;
pub use messaging::CommandListener;
pub use router::{UpdateRoute, ValueUpdateRouter};
