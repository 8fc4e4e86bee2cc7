use config::{Config, ConfigError, Environment, File};
use domain::transport::{Genre, NodeInfo, PrimitiveType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    /// Retained ONLINE/OFFLINE topic, `zwave/status/{agent_id}` when unset
    pub status_topic: Option<String>,
}

/// Which controller driver backs the bridge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    #[default]
    Simulator,
    OpenZwave,
}

/// Sine wave bounds for a simulated reading
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct WaveConfig {
    pub min_value: f64,
    pub max_value: f64,
    /// Seconds per full period
    #[serde(default = "default_wave_period")]
    pub period_secs: f64,
}

fn default_wave_period() -> f64 {
    10.0
}

/// A value of a simulated node, as the controller would report it
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SimulatedValue {
    pub id: u64,
    pub label: String,
    pub primitive: PrimitiveType,
    pub genre: Genre,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default = "default_instance")]
    pub instance: u8,
    #[serde(default)]
    pub index: u16,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub wave: Option<WaveConfig>,
}

fn default_instance() -> u8 {
    1
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SimulatedNode {
    pub node_id: u8,
    #[serde(default)]
    pub info: NodeInfo,
    /// Association group labels
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub values: Vec<SimulatedValue>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ControllerConfig {
    #[serde(default)]
    pub driver: DriverKind,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_config_folder")]
    pub config_folder: String,
    #[serde(default = "default_enable_sis")]
    pub enable_sis: bool,
    #[serde(default = "default_home_id")]
    pub home_id: u32,
    #[serde(default = "default_controller_node_id")]
    pub controller_node_id: u8,
    /// Simulated inventory, replayed on connect
    #[serde(default)]
    pub nodes: Vec<SimulatedNode>,
    /// Period of simulated readings, 0 disables them
    #[serde(default = "default_update_interval")]
    pub update_interval_ms: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_config_folder() -> String {
    "config/ozw".to_string()
}
fn default_enable_sis() -> bool {
    true
}
fn default_home_id() -> u32 {
    0x00c0_ffee
}
fn default_controller_node_id() -> u8 {
    1
}
fn default_update_interval() -> u64 {
    5000
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            driver: DriverKind::default(),
            log_level: default_log_level(),
            config_folder: default_config_folder(),
            enable_sis: default_enable_sis(),
            home_id: default_home_id(),
            controller_node_id: default_controller_node_id(),
            nodes: Vec::new(),
            update_interval_ms: default_update_interval(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BridgeConfig {
    pub agent_id: String,
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Publish controller level node details as attributes
    #[serde(default)]
    pub include_zw_info: bool,
    /// Labels whose notifications are dropped before dispatch
    #[serde(default = "default_ignore_values")]
    pub ignore_values: Vec<String>,
    #[serde(default = "default_check_alive_interval")]
    pub check_alive_interval_secs: u64,
}

fn default_ignore_values() -> Vec<String> {
    ["Exporting", "Color", "Previous Reading", "Interval"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_check_alive_interval() -> u64 {
    10
}

impl BridgeConfig {
    /// Loads `{config_dir}/default`, then `{config_dir}/{RUN_MODE}`, then
    /// `ZWAVE__*` environment variables, later sources winning.
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::load_with_mode(config_dir, &run_mode)
    }

    pub fn load_with_mode(config_dir: &str, run_mode: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("agent_id", "zwave-bridge")?
            .set_default("mqtt.host", "localhost")?
            .set_default("mqtt.port", 1883)?
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // e.g. ZWAVE__MQTT__HOST=10.0.0.1
            .add_source(Environment::with_prefix("ZWAVE").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        if config.check_alive_interval_secs == 0 {
            return Err(ConfigError::Message(
                "check_alive_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn status_topic(&self) -> String {
        self.mqtt
            .status_topic
            .clone()
            .unwrap_or_else(|| format!("zwave/status/{}", self.agent_id))
    }
}
