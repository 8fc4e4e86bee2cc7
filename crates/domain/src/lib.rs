//! Domain layer - Pure rules of the Z-Wave bridge with no external dependencies
//!
//! This crate contains:
//! - Transport model (TransportValue, Notification) and the controller port
//! - Registry model (LogicalDevice, OutputPoint, InputPoint) and the registry port
//! - Lookup tables and the value classifier
//! - Device run state machine
//! - Domain Events
//!
//! Principles:
//! - No dependencies on infrastructure
//! - Lookup tables are injected, never global
//! - Testable in isolation

pub mod classifier;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod lookup;
pub mod registry;
pub mod transport;

// Re-export commonly used types
pub use classifier::{ValueCategory, classify};
pub use error::DomainError;
pub use event::{DomainEvent, EventPublisher};
pub use lifecycle::RunState;
pub use lookup::LookupTables;
pub use registry::{DeviceRegistry, InputId, OutputId, PointKind};
pub use transport::{ControllerDriver, Notification, NotificationKind, TransportValue, ValueId};
