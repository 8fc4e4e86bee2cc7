use std::collections::BTreeMap;
use std::sync::Arc;

use domain::registry::{ConfigEntry, DataType};
use domain::transport::PrimitiveType;
use domain::{DomainError, PointKind, TransportValue, ValueCategory, classify};
use tracing::{debug, info};

use crate::context::BridgeContext;
use crate::correlation::ValueBinding;
use crate::router::ValueUpdateRouter;

/// First-sighting handling of a transport value.
///
/// Decides what the value is and attaches it to the device model.
/// Running it twice for the same value leaves the model unchanged.
#[derive(Clone)]
pub struct DiscoveryPipeline {
    ctx: Arc<BridgeContext>,
    router: ValueUpdateRouter,
}

impl DiscoveryPipeline {
    pub fn new(ctx: Arc<BridgeContext>, router: ValueUpdateRouter) -> Self {
        Self { ctx, router }
    }

    pub async fn discover(&self, value: &TransportValue) -> Result<ValueCategory, DomainError> {
        let address = value.hw_address();
        if self.ctx.registry.get_device(&address).await?.is_none() {
            self.ctx.registry.create_device(&address).await?;
        }

        let category = classify(value, &self.ctx.tables);
        match category {
            ValueCategory::Output(kind) => self.discover_output(&address, kind, value).await?,
            ValueCategory::Attribute | ValueCategory::Configuration => {
                self.discover_attribute(&address, category, value).await?
            }
        }
        Ok(category)
    }

    async fn discover_output(
        &self,
        address: &str,
        kind: PointKind,
        value: &TransportValue,
    ) -> Result<(), DomainError> {
        let registry = &self.ctx.registry;
        let instance = value.instance.to_string();
        let unit = self.ctx.tables.unit(&value.units);
        let data_type = self.ctx.tables.data_type(value.primitive);

        let mut output = match registry.get_output(address, kind, &instance).await? {
            Some(output) => output,
            None => {
                info!(device = %address, kind = %kind, instance = %instance, "New output");
                registry.create_output(address, kind, &instance).await?
            }
        };
        if !self.ctx.correlations.register_output(value.id, output.id.clone()) {
            return Ok(());
        }
        if output.unit != unit || output.data_type != data_type {
            output.unit = unit;
            output.data_type = data_type;
            registry.update_output(output).await?;
        }

        if value.is_writable() {
            let mut input = match registry.get_input(address, kind, &instance).await? {
                Some(input) => input,
                None => registry.create_input(address, kind, &instance).await?,
            };
            self.ctx
                .correlations
                .register_input(value.id, input.id.clone(), value.primitive);
            if input.unit != unit || input.data_type != data_type {
                input.unit = unit;
                input.data_type = data_type;
                registry.update_input(input).await?;
            }
        }

        debug!(
            device = %address,
            value_id = %value.id,
            kind = %kind,
            label = %value.label,
            writable = value.is_writable(),
            units = %value.units,
            "Discovered output"
        );

        // cached values are placeholders until the device reports
        if self.ctx.controller.is_value_set(value.id).await {
            self.router.route(value).await?;
        }
        Ok(())
    }

    async fn discover_attribute(
        &self,
        address: &str,
        category: ValueCategory,
        value: &TransportValue,
    ) -> Result<(), DomainError> {
        let registry = &self.ctx.registry;
        let name = value.attribute_name();
        if !self.ctx.correlations.register_attribute(value.id, address, &name) {
            return Ok(());
        }

        let values = BTreeMap::from([(name.clone(), value.value.clone())]);
        if category == ValueCategory::Configuration && value.is_writable() {
            let entry = ConfigEntry {
                data_type: self
                    .ctx
                    .tables
                    .data_type(value.primitive)
                    .unwrap_or(DataType::String),
                description: value.description(),
                writable: true,
                value: Some(value.value.clone()),
                choices: if value.primitive == PrimitiveType::List {
                    value.choices.clone()
                } else {
                    Vec::new()
                },
            };
            registry.update_config_entry(address, &name, entry).await?;
            registry.update_config_values(address, values).await?;
            self.ctx.correlations.register_config_value(
                address,
                &name,
                ValueBinding {
                    id: value.id,
                    primitive: value.primitive,
                },
            );
            info!(device = %address, name = %name, label = %value.label, value = %value.value, "Added configuration");
        } else {
            registry.update_attributes(address, values).await?;
            debug!(device = %address, name = %name, value = %value.value, "Added attribute");
        }
        Ok(())
    }
}
