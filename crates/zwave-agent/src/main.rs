use anyhow::{Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use application::{
    BridgeContext, BridgeOptions, CommandListener, CommandTranslator, LivenessMonitor,
    NotificationDispatcher,
};
use domain::LookupTables;
use infrastructure::config::BridgeConfig;
use infrastructure::messaging::MqttPublisherClient;
use infrastructure::{ControllerFactory, InMemoryRegistry, MqttClient, MqttEventPublisher};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config directory
    #[arg(long)]
    config_dir: Option<String>,

    /// Override Agent ID
    #[arg(long)]
    agent_id: Option<String>,

    /// Override MQTT Host
    #[arg(long)]
    mqtt_host: Option<String>,

    /// Override MQTT Port
    #[arg(long)]
    mqtt_port: Option<u16>,
}

async fn run() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,zwave_agent=debug,application=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("📡 Z-Wave Bridge Starting...");
    info!("🆔 Process ID: {}", std::process::id());

    let args = Args::parse();

    // run from the workspace root during development
    let dev_base = "crates/zwave-agent";
    let base_dir = if std::path::Path::new(dev_base).exists() {
        dev_base
    } else {
        "."
    };
    let config_dir = args
        .config_dir
        .unwrap_or_else(|| format!("{}/config", base_dir));
    info!("📂 Config directory: {}", config_dir);

    // 1. Configuration
    let mut config = BridgeConfig::load(&config_dir)?;
    if let Some(id) = args.agent_id {
        config.agent_id = id;
    }
    if let Some(host) = args.mqtt_host {
        config.mqtt.host = host;
    }
    if let Some(port) = args.mqtt_port {
        config.mqtt.port = port;
    }
    let agent_id = config.agent_id.clone();
    info!(
        agent_id = %agent_id,
        driver = ?config.controller.driver,
        controller_log_level = %config.controller.log_level,
        nodes = config.controller.nodes.len(),
        "✅ Loaded configuration"
    );

    // 2. MQTT
    info!(host = %config.mqtt.host, port = %config.mqtt.port, "Connecting to MQTT Broker...");
    let status_topic = config.status_topic();
    let last_will = rumqttc::LastWill::new(
        &status_topic,
        serde_json::json!({ "status": "OFFLINE" }).to_string(),
        rumqttc::QoS::AtLeastOnce,
        true,
    );
    let mqtt_client = MqttClient::new(
        &config.mqtt,
        &format!("zwave-{}", agent_id),
        Some(last_will),
    )
    .await?;

    // 3. Registry publishing to MQTT
    let publisher_client: Arc<dyn MqttPublisherClient> = Arc::new(mqtt_client.clone());
    let publisher = Arc::new(MqttEventPublisher::new(publisher_client, &agent_id));
    let registry = Arc::new(InMemoryRegistry::new(publisher));

    // 4. Controller and bridge core
    let (controller, notifications) = ControllerFactory::create(&config.controller)?;
    let options = BridgeOptions {
        include_zw_info: config.include_zw_info,
        ignore_labels: config.ignore_values.clone(),
        ..Default::default()
    };
    let ctx = Arc::new(BridgeContext::new(
        controller.clone(),
        registry,
        LookupTables::default(),
        options,
    ));

    let cancel = CancellationToken::new();

    let dispatcher = NotificationDispatcher::new(ctx.clone());
    let dispatcher_handle = tokio::spawn(dispatcher.run(notifications, cancel.clone()));

    // 5. Commands from MQTT
    let translator = Arc::new(CommandTranslator::new(ctx.clone()));
    let listener = CommandListener::new(Arc::new(mqtt_client.clone()), agent_id.clone(), translator);
    let listener_cancel = cancel.clone();
    let listener_handle = tokio::spawn(async move {
        listener.start(listener_cancel).await;
    });

    // 6. Open the controller; its startup notifications flow to the dispatcher
    controller.connect().await?;
    info!("🔌 Controller connected ({})", controller.version());

    if let Err(e) = mqtt_client
        .publish(
            &status_topic,
            &serde_json::json!({ "status": "ONLINE", "version": controller.version() })
                .to_string(),
            true,
        )
        .await
    {
        warn!("Failed to publish ONLINE status: {}", e);
    }

    // 7. Liveness, fatal when the controller goes away
    let monitor = LivenessMonitor::new(
        controller.clone(),
        Duration::from_secs(config.check_alive_interval_secs),
    );
    let mut liveness = tokio::spawn(monitor.run(cancel.clone()));

    let outcome = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("🛑 Shutting down..."),
                Err(err) => warn!(error = %err, "Unable to listen for shutdown signal"),
            }
            Ok(())
        }
        joined = &mut liveness => match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                error!(error = %e, "💀 Controller lost, exiting");
                Err(anyhow!(e))
            }
            Err(e) => Err(anyhow!("liveness monitor panicked: {}", e)),
        },
    };

    cancel.cancel();
    if let Err(e) = controller.disconnect().await {
        warn!(error = %e, "Controller disconnect failed");
    }
    let _ = dispatcher_handle.await;
    let _ = listener_handle.await;

    let offline_payload = serde_json::json!({ "status": "OFFLINE" }).to_string();
    let _ = mqtt_client
        .publish(&status_topic, &offline_payload, true)
        .await;

    if outcome.is_ok() {
        info!("👋 Good bye!");
    }
    outcome
}

fn main() {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(run()) {
        eprintln!("\n❌ CRITICAL ERROR: {:?}", e);
        std::process::exit(1);
    }
}
