use std::collections::BTreeMap;
use std::sync::Arc;

use domain::{DomainError, OutputId, TransportValue};
use tracing::{debug, trace};

use crate::context::BridgeContext;

/// Where a value update ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateRoute {
    Output(OutputId),
    Configuration { address: String, name: String },
    Attribute { address: String, name: String },
    /// No correlation for the value; nothing was written
    Dropped,
}

/// Routes value updates of already discovered values to the registry.
#[derive(Clone)]
pub struct ValueUpdateRouter {
    ctx: Arc<BridgeContext>,
}

impl ValueUpdateRouter {
    pub fn new(ctx: Arc<BridgeContext>) -> Self {
        Self { ctx }
    }

    pub async fn route(&self, value: &TransportValue) -> Result<UpdateRoute, DomainError> {
        if let Some(output_id) = self.ctx.correlations.lookup_output(value.id) {
            trace!(value_id = %value.id, output = %output_id, value = %value.value, "Output value update");
            self.ctx
                .registry
                .update_output_value(&output_id, value.value.clone())
                .await?;
            return Ok(UpdateRoute::Output(output_id));
        }

        let Some(attr) = self.ctx.correlations.lookup_attribute(value.id) else {
            debug!(
                value_id = %value.id,
                node_id = value.node_id,
                label = %value.label,
                "Ignored update for uncorrelated value"
            );
            return Ok(UpdateRoute::Dropped);
        };

        let Some(device) = self.ctx.registry.get_device(&attr.address).await? else {
            debug!(value_id = %value.id, device = %attr.address, "Ignored update for unknown device");
            return Ok(UpdateRoute::Dropped);
        };

        let values = BTreeMap::from([(attr.name.clone(), value.value.clone())]);
        if device.has_config(&attr.name) {
            debug!(device = %attr.address, name = %attr.name, value = %value.value, "Configuration update");
            self.ctx
                .registry
                .update_config_values(&attr.address, values)
                .await?;
            Ok(UpdateRoute::Configuration {
                address: attr.address,
                name: attr.name,
            })
        } else {
            debug!(device = %attr.address, name = %attr.name, value = %value.value, "Attribute update");
            self.ctx
                .registry
                .update_attributes(&attr.address, values)
                .await?;
            Ok(UpdateRoute::Attribute {
                address: attr.address,
                name: attr.name,
            })
        }
    }
}
