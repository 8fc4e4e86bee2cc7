mod simulator;

pub use simulator::SimulatedController;

use std::sync::Arc;

use domain::DomainError;
use domain::transport::{ControllerDriver, Notification};
use tokio::sync::mpsc;

use crate::config::{ControllerConfig, DriverKind};

/// Controller driver together with its notification stream
pub type ControllerHandle = (
    Arc<dyn ControllerDriver>,
    mpsc::UnboundedReceiver<Notification>,
);

/// Factory for creating controller drivers
pub struct ControllerFactory;

impl ControllerFactory {
    pub fn create(config: &ControllerConfig) -> Result<ControllerHandle, DomainError> {
        match config.driver {
            DriverKind::Simulator => {
                let (controller, notifications) = SimulatedController::new(config);
                Ok((Arc::new(controller), notifications))
            }
            DriverKind::OpenZwave => Err(DomainError::InvalidConfiguration(format!(
                "OpenZWave driver not yet implemented (config folder {})",
                config.config_folder
            ))),
        }
    }
}
