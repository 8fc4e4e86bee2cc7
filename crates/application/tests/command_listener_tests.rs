mod common;

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use application::{CommandListener, CommandTranslator, DiscoveryPipeline, ValueUpdateRouter};
use common::{Harness, value};
use domain::transport::{Genre, PrimitiveType, TypedValue, ValueId};
use infrastructure::messaging::MqttCommandClient;
use infrastructure::MqttMessage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

struct FakeBroker {
    tx: broadcast::Sender<MqttMessage>,
    subscriptions: Mutex<Vec<String>>,
    acks: Mutex<Vec<u16>>,
}

impl FakeBroker {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            tx,
            subscriptions: Mutex::new(Vec::new()),
            acks: Mutex::new(Vec::new()),
        }
    }

    fn deliver(&self, topic: &str, payload: &[u8], pkid: u16) {
        self.tx
            .send(MqttMessage {
                topic: topic.to_string(),
                payload: payload.to_vec(),
                pkid,
            })
            .unwrap();
    }

    fn acks(&self) -> Vec<u16> {
        self.acks.lock().unwrap().clone()
    }

    async fn wait_for(&self, condition: impl Fn(&Self) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition(self) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition reached in time");
    }
}

#[async_trait]
impl MqttCommandClient for FakeBroker {
    fn subscribe_messages(&self) -> broadcast::Receiver<MqttMessage> {
        self.tx.subscribe()
    }

    async fn subscribe(&self, topic: &str) -> anyhow::Result<()> {
        self.subscriptions.lock().unwrap().push(topic.to_string());
        Ok(())
    }

    async fn ack(&self, _topic: &str, pkid: u16) -> anyhow::Result<()> {
        self.acks.lock().unwrap().push(pkid);
        Ok(())
    }
}

#[tokio::test]
async fn test_every_delivery_is_acked() {
    let h = Harness::new();
    DiscoveryPipeline::new(h.ctx.clone(), ValueUpdateRouter::new(h.ctx.clone()))
        .discover(&value(42, 5, "Switch", PrimitiveType::Bool, Genre::User))
        .await
        .unwrap();

    let broker = Arc::new(FakeBroker::new());
    let listener = CommandListener::new(
        broker.clone(),
        "hall".to_string(),
        Arc::new(CommandTranslator::new(h.ctx.clone())),
    );
    let cancel = CancellationToken::new();
    let listener_cancel = cancel.clone();
    let handle = tokio::spawn(async move { listener.start(listener_cancel).await });

    broker
        .wait_for(|b| b.subscriptions.lock().unwrap().len() == 2)
        .await;

    broker.deliver("zwave/hall/node/5/config/set", b"not json", 1);
    broker.deliver("zwave/hall/input/5/laser/1/set", b"1", 2);
    broker.deliver("zwave/hall/input/5/onoffswitch/1/set", b"off", 3);
    broker.deliver("zwave/hall/input/9/onoffswitch/1/set", b"on", 4);

    broker.wait_for(|b| b.acks().len() == 4).await;
    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(broker.acks(), vec![1, 2, 3, 4]);
    assert_eq!(
        h.controller.writes(),
        vec![(ValueId(42), TypedValue::Bool(false))]
    );
}
