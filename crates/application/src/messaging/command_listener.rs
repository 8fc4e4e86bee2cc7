use std::collections::BTreeMap;
use std::sync::Arc;

use domain::InputId;
use infrastructure::messaging::MqttCommandClient;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::command::CommandTranslator;

const SENDER: &str = "mqtt";

/// A registry side write received over MQTT
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCommand {
    /// `{prefix}/input/{address}/{kind}/{instance}/set`, raw payload
    Input { input_id: InputId, payload: String },
    /// `{prefix}/node/{address}/config/set`, JSON object of name to value
    Config {
        address: String,
        values: BTreeMap<String, String>,
    },
}

/// Parses a command message. Returns `None` for topics that are not commands.
pub fn parse_command(prefix: &str, topic: &str, payload: &[u8]) -> Option<BridgeCommand> {
    let rest = topic.strip_prefix(prefix)?.strip_prefix('/')?;
    let rest = rest.strip_suffix("/set")?;
    let payload_str = String::from_utf8_lossy(payload);

    if let Some(input) = rest.strip_prefix("input/") {
        let input_id = InputId::parse(input)?;
        return Some(BridgeCommand::Input {
            input_id,
            payload: payload_str.into_owned(),
        });
    }

    let address = rest.strip_prefix("node/")?.strip_suffix("/config")?;
    if address.is_empty() || address.contains('/') {
        return None;
    }
    match serde_json::from_str::<BTreeMap<String, serde_json::Value>>(&payload_str) {
        Ok(map) => {
            let values = map
                .into_iter()
                .map(|(name, value)| {
                    let value = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (name, value)
                })
                .collect();
            Some(BridgeCommand::Config {
                address: address.to_string(),
                values,
            })
        }
        Err(e) => {
            warn!(topic = %topic, error = %e, "Configuration command is not a JSON object");
            None
        }
    }
}

pub struct CommandListener {
    mqtt_client: Arc<dyn MqttCommandClient>,
    agent_id: String,
    translator: Arc<CommandTranslator>,
}

impl CommandListener {
    pub fn new(
        mqtt_client: Arc<dyn MqttCommandClient>,
        agent_id: String,
        translator: Arc<CommandTranslator>,
    ) -> Self {
        Self {
            mqtt_client,
            agent_id,
            translator,
        }
    }

    fn prefix(&self) -> String {
        format!("zwave/{}", self.agent_id)
    }

    pub async fn start(&self, cancel: CancellationToken) {
        let prefix = self.prefix();
        let topics = [
            format!("{}/input/+/+/+/set", prefix),
            format!("{}/node/+/config/set", prefix),
        ];

        // internal receiver first, so nothing arriving right after SUBACK is lost
        let mut rx = self.mqtt_client.subscribe_messages();
        for topic in &topics {
            if let Err(e) = self.mqtt_client.subscribe(topic).await {
                error!(agent_id = %self.agent_id, topic = %topic, error = %e, "Failed to subscribe to commands");
                return;
            }
        }
        info!(agent_id = %self.agent_id, prefix = %prefix, "Listening for commands");

        loop {
            let msg = tokio::select! {
                _ = cancel.cancelled() => break,
                received = rx.recv() => match received {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        warn!(agent_id = %self.agent_id, skipped = count, "Command listener lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        warn!(agent_id = %self.agent_id, "Command channel closed");
                        break;
                    }
                }
            };

            match parse_command(&prefix, &msg.topic, &msg.payload) {
                Some(command) => {
                    debug!(topic = %msg.topic, "Received command");
                    self.handle_command(command).await;
                }
                None => debug!(topic = %msg.topic, "Skipped message that is not a command"),
            }

            // unacked deliveries are replayed by the broker on reconnect
            if let Err(e) = self.mqtt_client.ack(&msg.topic, msg.pkid).await {
                warn!(agent_id = %self.agent_id, error = %e, "Failed to ack command");
            }
        }
    }

    async fn handle_command(&self, command: BridgeCommand) {
        match command {
            BridgeCommand::Input { input_id, payload } => {
                if let Err(e) = self
                    .translator
                    .handle_input_command(&input_id, SENDER, &payload)
                    .await
                {
                    warn!(input = %input_id, error = %e, "Input command rejected");
                }
            }
            BridgeCommand::Config { address, values } => {
                match self.translator.handle_config_command(&address, values).await {
                    Ok(report) => info!(
                        device = %address,
                        applied = report.applied.len(),
                        forwarded = report.forwarded.len(),
                        failed = report.failed.len(),
                        "Configuration command handled"
                    ),
                    Err(e) => warn!(device = %address, error = %e, "Configuration command rejected"),
                }
            }
        }
    }
}
