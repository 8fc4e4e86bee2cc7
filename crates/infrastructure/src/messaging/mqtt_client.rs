use anyhow::{Result, anyhow};
use rumqttc::{AsyncClient, Event, EventLoop, LastWill, MqttOptions, Packet, QoS};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::config::MqttConfig;

#[derive(Clone, Debug)]
pub struct MqttMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub pkid: u16,
}

/// Publishing side of the broker connection
#[async_trait::async_trait]
pub trait MqttPublisherClient: Send + Sync {
    async fn publish_bytes(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<()>;
    fn is_connected(&self) -> bool;
}

/// Command side of the broker connection
#[async_trait::async_trait]
pub trait MqttCommandClient: Send + Sync {
    fn subscribe_messages(&self) -> broadcast::Receiver<MqttMessage>;
    async fn subscribe(&self, topic: &str) -> Result<()>;
    /// Releases a QoS 1 delivery; every received message must be acked once
    async fn ack(&self, topic: &str, pkid: u16) -> Result<()>;
}

/// Broker connection shared by the event publisher and the command listener.
///
/// Incoming publishes fan out on a broadcast channel; subscriptions are
/// replayed after every reconnect.
#[derive(Clone)]
pub struct MqttClient {
    client: AsyncClient,
    tx: broadcast::Sender<MqttMessage>,
    connected: Arc<AtomicBool>,
    subscriptions: Arc<Mutex<Vec<String>>>,
}

impl MqttClient {
    pub async fn new(
        config: &MqttConfig,
        client_id: &str,
        last_will: Option<LastWill>,
    ) -> Result<Self> {
        let mut options = MqttOptions::new(client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(20));
        // commands survive a reconnect
        options.set_clean_session(false);
        options.set_manual_acks(true);
        if let Some(will) = last_will {
            options.set_last_will(will);
        }

        let (client, eventloop) = AsyncClient::new(options, 100);
        let (tx, _) = broadcast::channel(250);

        let mqtt = Self {
            client,
            tx,
            connected: Arc::new(AtomicBool::new(false)),
            subscriptions: Arc::new(Mutex::new(Vec::new())),
        };
        mqtt.spawn_event_loop(eventloop);
        Ok(mqtt)
    }

    fn spawn_event_loop(&self, mut eventloop: EventLoop) {
        let this = self.clone();
        tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let msg = MqttMessage {
                            topic: publish.topic,
                            payload: publish.payload.to_vec(),
                            pkid: publish.pkid,
                        };
                        if let Err(broadcast::error::SendError(dropped)) = this.tx.send(msg) {
                            debug!(topic = %dropped.topic, "No listener for incoming message");
                        }
                    }
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("MQTT Connected");
                        this.connected.store(true, Ordering::Relaxed);
                        this.resubscribe().await;
                    }
                    Ok(Event::Outgoing(rumqttc::Outgoing::Disconnect)) => {
                        this.connected.store(false, Ordering::Relaxed);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(error = ?e, "MQTT Connection error");
                        this.connected.store(false, Ordering::Relaxed);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });
    }

    fn topics(&self) -> Vec<String> {
        self.subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn resubscribe(&self) {
        let topics = self.topics();
        if topics.is_empty() {
            return;
        }
        info!(count = topics.len(), "Re-subscribing to topics");
        for topic in topics {
            if let Err(e) = self.client.subscribe(&topic, QoS::AtLeastOnce).await {
                warn!(topic = %topic, error = %e, "Failed to re-subscribe");
            }
        }
    }

    pub fn subscribe_messages(&self) -> broadcast::Receiver<MqttMessage> {
        self.tx.subscribe()
    }

    pub async fn publish(&self, topic: &str, payload: &str, retain: bool) -> Result<()> {
        self.publish_bytes(topic, payload.as_bytes(), QoS::AtLeastOnce, retain)
            .await
    }

    pub async fn subscribe(&self, topic: &str) -> Result<()> {
        {
            let mut subs = self.subscriptions.lock().unwrap_or_else(|e| e.into_inner());
            if !subs.iter().any(|s| s == topic) {
                subs.push(topic.to_string());
            }
        }

        self.client
            .subscribe(topic, QoS::AtLeastOnce)
            .await
            .map_err(|e| anyhow!("Failed to subscribe to topic {}: {}", topic, e))
    }

    pub async fn ack(&self, topic: &str, pkid: u16) -> Result<()> {
        let publish = rumqttc::Publish {
            pkid,
            topic: topic.to_string(),
            qos: QoS::AtLeastOnce,
            payload: bytes::Bytes::new(),
            retain: false,
            dup: false,
        };

        self.client
            .ack(&publish)
            .await
            .map_err(|e| anyhow!("Failed to ack packet {}: {}", pkid, e))
    }
}

#[async_trait::async_trait]
impl MqttPublisherClient for MqttClient {
    async fn publish_bytes(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<()> {
        self.client
            .publish(topic, qos, retain, payload)
            .await
            .map_err(|e| anyhow!("Failed to publish MQTT message: {}", e))
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl MqttCommandClient for MqttClient {
    fn subscribe_messages(&self) -> broadcast::Receiver<MqttMessage> {
        MqttClient::subscribe_messages(self)
    }

    async fn subscribe(&self, topic: &str) -> Result<()> {
        MqttClient::subscribe(self, topic).await
    }

    async fn ack(&self, topic: &str, pkid: u16) -> Result<()> {
        MqttClient::ack(self, topic, pkid).await
    }
}
