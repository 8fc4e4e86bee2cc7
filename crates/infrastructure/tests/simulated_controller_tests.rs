use domain::DomainError;
use domain::transport::{
    ControllerDriver, Genre, NetworkCommand, NodeInfo, Notification, NotificationCode,
    NotificationKind, PrimitiveType, TypedValue, ValueId,
};
use infrastructure::SimulatedController;
use infrastructure::config::{ControllerConfig, SimulatedNode, SimulatedValue};
use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};

const HOME: u32 = 0x00c0_ffee;

fn value(id: u64, label: &str, primitive: PrimitiveType, genre: Genre, value: &str) -> SimulatedValue {
    SimulatedValue {
        id,
        label: label.to_string(),
        primitive,
        genre,
        units: String::new(),
        help: String::new(),
        read_only: false,
        instance: 1,
        index: 0,
        value: value.to_string(),
        choices: Vec::new(),
        wave: None,
    }
}

fn inventory() -> ControllerConfig {
    let mut config_param = value(70, "MyCustomParam", PrimitiveType::Byte, Genre::Config, "3");
    config_param.index = 7;
    let mut level = value(71, "Indicator", PrimitiveType::List, Genre::Config, "On");
    level.choices = vec!["On".to_string(), "Off".to_string()];
    let mut reading = value(72, "Temperature", PrimitiveType::Decimal, Genre::User, "21.0");
    reading.read_only = true;

    ControllerConfig {
        home_id: HOME,
        update_interval_ms: 0,
        nodes: vec![
            SimulatedNode {
                node_id: 5,
                info: NodeInfo {
                    manufacturer: "Aeotec".to_string(),
                    product_name: "Smart Switch 6".to_string(),
                    awake: true,
                    query_stage: "Complete".to_string(),
                    ..Default::default()
                },
                groups: vec!["Lifeline".to_string()],
                values: vec![
                    value(42, "Switch", PrimitiveType::Bool, Genre::User, "true"),
                    config_param,
                    level,
                    reading,
                ],
            },
            SimulatedNode {
                node_id: 9,
                info: NodeInfo {
                    failed: true,
                    ..Default::default()
                },
                groups: Vec::new(),
                values: Vec::new(),
            },
        ],
        ..Default::default()
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}

#[tokio::test]
async fn test_connect_replays_inventory_in_order() {
    let (controller, mut rx) = SimulatedController::new(&inventory());
    assert!(!controller.is_alive().await);

    assert_ok!(controller.connect().await);
    assert!(controller.is_alive().await);

    let kinds: Vec<(NotificationKind, u8)> =
        drain(&mut rx).iter().map(|n| (n.kind, n.node_id)).collect();
    assert_eq!(
        kinds,
        vec![
            (NotificationKind::DriverReady, 1),
            (NotificationKind::NodeAdded, 5),
            (NotificationKind::ValueAdded, 5),
            (NotificationKind::ValueAdded, 5),
            (NotificationKind::ValueAdded, 5),
            (NotificationKind::ValueAdded, 5),
            (NotificationKind::NodeQueriesComplete, 5),
            (NotificationKind::NodeAdded, 9),
            (NotificationKind::NodeQueriesComplete, 9),
            (NotificationKind::Notification, 9),
            (NotificationKind::AllNodesQueried, 1),
        ]
    );

    // a second connect does not replay again
    assert_ok!(controller.connect().await);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_failed_node_reports_dead() {
    let (controller, mut rx) = SimulatedController::new(&inventory());
    controller.connect().await.unwrap();

    let dead = drain(&mut rx)
        .into_iter()
        .find(|n| n.kind == NotificationKind::Notification)
        .unwrap();
    assert_eq!(dead.node_id, 9);
    assert_eq!(dead.code, Some(NotificationCode::Dead));
}

#[tokio::test]
async fn test_writes_are_confirmed() {
    let (controller, mut rx) = SimulatedController::new(&inventory());
    controller.connect().await.unwrap();
    drain(&mut rx);

    assert_ok!(controller.set_value(ValueId(42), TypedValue::Bool(false)).await);
    let confirmed = rx.try_recv().unwrap();
    assert_eq!(confirmed.kind, NotificationKind::ValueChanged);
    let value = confirmed.value.unwrap();
    assert_eq!(value.id, ValueId(42));
    assert_eq!(value.value, "false");
    assert_eq!(controller.value_as_string(ValueId(42)).await.unwrap(), "false");

    assert_ok!(controller.set_value(ValueId(70), TypedValue::Byte(12)).await);
    assert_eq!(rx.try_recv().unwrap().value.unwrap().value, "12");
}

#[tokio::test]
async fn test_rejected_writes() {
    let (controller, mut rx) = SimulatedController::new(&inventory());
    controller.connect().await.unwrap();
    drain(&mut rx);

    assert_err!(controller.set_value(ValueId(72), TypedValue::Decimal(3.0)).await);
    assert_err!(
        controller
            .set_value(ValueId(71), TypedValue::ListSelection("Blink".to_string()))
            .await
    );
    assert_err!(controller.set_value(ValueId(999), TypedValue::Bool(true)).await);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_node_queries() {
    let (controller, _rx) = SimulatedController::new(&inventory());

    let info = controller.node_info(HOME, 5).await.unwrap();
    assert_eq!(info.manufacturer, "Aeotec");
    assert!(info.queries_complete());

    let own = controller.node_info(HOME, 1).await.unwrap();
    assert!(own.queries_complete());

    assert_eq!(
        controller.group_labels(HOME, 5).await.unwrap(),
        vec!["Lifeline".to_string()]
    );
    assert_err!(controller.node_info(HOME, 77).await);
    assert_err!(controller.node_info(0xdead, 5).await);

    let info = controller.controller_info(HOME).await.unwrap();
    assert_eq!(info.controller_node_id, 1);
    assert!(info.is_static_update_controller);

    assert!(controller.is_value_set(ValueId(42)).await);
    assert!(!controller.is_value_set(ValueId(999)).await);
}

#[tokio::test]
async fn test_network_commands() {
    let (controller, mut rx) = SimulatedController::new(&inventory());
    controller.connect().await.unwrap();
    drain(&mut rx);

    assert_ok!(controller.execute(HOME, NetworkCommand::AddNode { secure: true }).await);
    assert_ok!(controller.execute(HOME, NetworkCommand::CancelCommand).await);
    assert_ok!(controller.execute(HOME, NetworkCommand::HealNetwork).await);
    assert!(drain(&mut rx).is_empty());

    assert_ok!(controller.execute(HOME, NetworkCommand::RequestNodeValues(5)).await);
    let refreshed = drain(&mut rx);
    assert_eq!(refreshed.len(), 4);
    assert!(refreshed
        .iter()
        .all(|n| n.kind == NotificationKind::ValueRefreshed));

    // only failed nodes can be removed
    let err = assert_err!(controller.execute(HOME, NetworkCommand::RemoveFailedNode(5)).await);
    assert!(matches!(err, DomainError::DriverError(_)));

    assert_ok!(controller.execute(HOME, NetworkCommand::RemoveFailedNode(9)).await);
    let removed = rx.try_recv().unwrap();
    assert_eq!(removed.kind, NotificationKind::NodeRemoved);
    assert_eq!(removed.node_id, 9);
    assert_err!(controller.node_info(HOME, 9).await);
    assert_err!(controller.execute(HOME, NetworkCommand::RefreshNodeInfo(9)).await);
}

#[tokio::test]
async fn test_liveness_follows_connection() {
    let (controller, _rx) = SimulatedController::new(&inventory());
    controller.connect().await.unwrap();

    controller.set_alive(false);
    assert!(!controller.is_alive().await);

    controller.set_alive(true);
    controller.disconnect().await.unwrap();
    assert!(!controller.is_alive().await);
}

#[tokio::test]
async fn test_wave_values_produce_readings() {
    let mut config = inventory();
    config.update_interval_ms = 10;
    config.nodes[0].values[3].wave = Some(infrastructure::config::WaveConfig {
        min_value: 18.0,
        max_value: 24.0,
        period_secs: 10.0,
    });
    let (controller, mut rx) = SimulatedController::new(&config);
    controller.connect().await.unwrap();
    drain(&mut rx);

    let reading = tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reading.kind, NotificationKind::ValueChanged);
    let value = reading.value.unwrap();
    assert_eq!(value.id, ValueId(72));
    let number: f64 = value.value.parse().unwrap();
    assert!((18.0..=24.0).contains(&number));

    controller.disconnect().await.unwrap();
}
