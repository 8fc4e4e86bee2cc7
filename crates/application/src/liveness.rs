use std::sync::Arc;
use std::time::Duration;

use domain::{ControllerDriver, DomainError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically probes the controller.
///
/// Losing the controller is fatal: `run` returns `ConnectionLost` and the
/// process is expected to exit so a supervisor can restart it.
pub struct LivenessMonitor {
    controller: Arc<dyn ControllerDriver>,
    interval: Duration,
}

impl LivenessMonitor {
    /// Intervals below one second are raised to one second
    pub fn new(controller: Arc<dyn ControllerDriver>, interval: Duration) -> Self {
        Self {
            controller,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn run(self, cancel: CancellationToken) -> Result<(), DomainError> {
        info!(interval_secs = self.interval.as_secs(), "Liveness monitor started");
        let mut timer = tokio::time::interval(self.interval);
        // first tick completes immediately
        timer.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Liveness monitor stopped");
                    return Ok(());
                }
                _ = timer.tick() => {
                    if self.controller.is_alive().await {
                        debug!("Controller alive");
                    } else {
                        error!("Controller is not responding");
                        return Err(DomainError::ConnectionLost(
                            "controller failed the liveness check".to_string(),
                        ));
                    }
                }
            }
        }
    }
}
