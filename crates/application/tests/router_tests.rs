mod common;

use application::{DeviceLifecycleManager, DiscoveryPipeline, UpdateRoute, ValueUpdateRouter};
use common::{Harness, value};
use domain::registry::DeviceRegistry;
use domain::transport::{Genre, PrimitiveType, TransportValue};

async fn discovered(h: &Harness, tv: &TransportValue) -> ValueUpdateRouter {
    let router = ValueUpdateRouter::new(h.ctx.clone());
    DiscoveryPipeline::new(h.ctx.clone(), router.clone())
        .discover(tv)
        .await
        .unwrap();
    router
}

fn route_to(address: &str, name: &str) -> (String, String) {
    (address.to_string(), name.to_string())
}

#[tokio::test]
async fn test_user_value_updates_attribute() {
    let h = Harness::new();
    let mut firmware = value(80, 5, "Firmware Version", PrimitiveType::String, Genre::User);
    firmware.value = "1.2".to_string();
    let router = discovered(&h, &firmware).await;

    let route = router.route(&firmware.with_value("1.3")).await.unwrap();

    let UpdateRoute::Attribute { address, name } = route else {
        panic!("expected an attribute route, got {:?}", route);
    };
    assert_eq!((address, name), route_to("5", "Firmware Version"));
    assert_eq!(h.device("5").await.attribute("Firmware Version"), Some("1.3"));
}

#[tokio::test]
async fn test_writable_config_updates_configuration() {
    let h = Harness::new();
    let mut param = value(70, 5, "MyCustomParam", PrimitiveType::Byte, Genre::Config);
    param.index = 7;
    param.value = "3".to_string();
    let router = discovered(&h, &param).await;

    let route = router.route(&param.with_value("12")).await.unwrap();

    assert_eq!(
        route,
        UpdateRoute::Configuration {
            address: "5".to_string(),
            name: "7".to_string(),
        }
    );
    let device = h.device("5").await;
    assert_eq!(device.config["7"].value.as_deref(), Some("12"));
    assert_eq!(device.attribute("7"), None);
}

#[tokio::test]
async fn test_attribute_without_config_entry_falls_back_to_attribute() {
    let h = Harness::new();
    let mut fixed = value(82, 5, "Protection", PrimitiveType::Byte, Genre::Config);
    fixed.index = 4;
    fixed.read_only = true;
    fixed.value = "0".to_string();
    let router = discovered(&h, &fixed).await;

    let route = router.route(&fixed.with_value("2")).await.unwrap();

    assert_eq!(
        route,
        UpdateRoute::Attribute {
            address: "5".to_string(),
            name: "4".to_string(),
        }
    );
    let device = h.device("5").await;
    assert_eq!(device.attribute("4"), Some("2"));
    assert!(!device.has_config("4"));
}

#[tokio::test]
async fn test_updates_after_node_removal_are_dropped() {
    let h = Harness::new();
    let mut firmware = value(80, 5, "Firmware Version", PrimitiveType::String, Genre::User);
    firmware.value = "1.2".to_string();
    let router = discovered(&h, &firmware).await;

    DeviceLifecycleManager::new(h.ctx.clone())
        .remove_node(5)
        .await
        .unwrap();
    h.registry.reset_calls();

    let route = router.route(&firmware.with_value("1.3")).await.unwrap();

    assert_eq!(route, UpdateRoute::Dropped);
    assert_eq!(h.registry.calls(), 0);
    assert!(h.registry.get_device("5").await.unwrap().is_none());
}

#[tokio::test]
async fn test_correlated_value_of_deleted_device_is_dropped() {
    let h = Harness::new();
    let mut firmware = value(80, 5, "Firmware Version", PrimitiveType::String, Genre::User);
    firmware.value = "1.2".to_string();
    let router = discovered(&h, &firmware).await;

    // registry side deletion leaves the correlation in place
    h.registry.delete_device("5").await.unwrap();

    let route = router.route(&firmware.with_value("1.3")).await.unwrap();

    assert_eq!(route, UpdateRoute::Dropped);
    assert!(h.registry.get_device("5").await.unwrap().is_none());
}
