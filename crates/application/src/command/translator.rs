use std::collections::BTreeMap;
use std::sync::Arc;

use domain::transport::{PrimitiveType, TypedValue};
use domain::{DomainError, InputId};
use tracing::{info, warn};

use super::buttons::ControllerButton;
use crate::context::BridgeContext;
use crate::correlation::ValueBinding;

/// Outcome of a configuration change request
#[derive(Debug, Default)]
pub struct ConfigReport {
    /// Names written straight into the registry (no transport value behind them)
    pub applied: Vec<String>,
    /// Names sent to the controller; the registry follows once it confirms
    pub forwarded: Vec<String>,
    pub failed: Vec<(String, DomainError)>,
}

/// Turns registry side writes into typed controller writes.
///
/// Never updates registry values for transport backed settings; those only
/// change when the controller reports the new value.
#[derive(Clone)]
pub struct CommandTranslator {
    ctx: Arc<BridgeContext>,
}

impl CommandTranslator {
    pub fn new(ctx: Arc<BridgeContext>) -> Self {
        Self { ctx }
    }

    /// Applies a configuration change to a device
    pub async fn handle_config_command(
        &self,
        address: &str,
        values: BTreeMap<String, String>,
    ) -> Result<ConfigReport, DomainError> {
        if self.ctx.registry.get_device(address).await?.is_none() {
            warn!(device = %address, "Configuration command for unknown device");
            return Err(DomainError::UnknownDevice(address.to_string()));
        }

        let mut report = ConfigReport::default();
        let mut direct = BTreeMap::new();

        for (name, payload) in values {
            let Some(binding) = self.ctx.correlations.lookup_config_value(address, &name) else {
                direct.insert(name, payload);
                continue;
            };
            match self.write(address, &name, binding, &payload, false).await {
                Ok(()) => {
                    info!(device = %address, name = %name, value = %payload, "Configuration forwarded");
                    report.forwarded.push(name);
                }
                Err(e) => {
                    warn!(device = %address, name = %name, error = %e, "Configuration change failed");
                    report.failed.push((name, e));
                }
            }
        }

        if !direct.is_empty() {
            report.applied = direct.keys().cloned().collect();
            self.ctx
                .registry
                .update_config_values(address, direct)
                .await?;
        }
        Ok(report)
    }

    /// Writes a payload to an input
    pub async fn handle_input_command(
        &self,
        input_id: &InputId,
        sender: &str,
        payload: &str,
    ) -> Result<(), DomainError> {
        let address = input_id.address();
        match self.ctx.correlations.lookup_input(input_id) {
            Some(binding) => {
                info!(device = %address, input = %input_id, sender = %sender, value = %payload, "Input command");
                self.write(address, input_id.as_str(), binding, payload, true)
                    .await
                    .inspect_err(|e| {
                        warn!(device = %address, input = %input_id, error = %e, "Input command failed")
                    })
            }
            None => self.press_button(input_id, sender, payload).await,
        }
    }

    async fn press_button(
        &self,
        input_id: &InputId,
        sender: &str,
        payload: &str,
    ) -> Result<(), DomainError> {
        let Some(input) = self.ctx.registry.get_input_by_id(input_id).await? else {
            warn!(input = %input_id, "Command for an input that was never discovered");
            return Err(DomainError::UnknownInput(input_id.to_string()));
        };
        if !input.is_push_button() {
            warn!(input = %input_id, "Input has no transport value, command ignored");
            return Ok(());
        }
        let Some(button) = ControllerButton::from_instance(&input.instance) else {
            warn!(input = %input_id, instance = %input.instance, "Unknown push button, command ignored");
            return Ok(());
        };

        let command = button.command(payload)?;
        info!(button = %input.instance, sender = %sender, command = ?command, "Push button");
        self.ctx
            .controller
            .execute(self.ctx.home_id(), command)
            .await
    }

    async fn write(
        &self,
        address: &str,
        target: &str,
        binding: ValueBinding,
        payload: &str,
        switch_semantics: bool,
    ) -> Result<(), DomainError> {
        let value = match binding.primitive {
            PrimitiveType::Bool | PrimitiveType::Button if switch_semantics => {
                TypedValue::switch(payload)
            }
            primitive => TypedValue::parse(primitive, payload)?,
        };

        self.ctx
            .controller
            .set_value(binding.id, value)
            .await
            .map_err(|e| DomainError::TransportWrite {
                device: address.to_string(),
                target: target.to_string(),
                reason: e.to_string(),
            })
    }
}
