//! Device engine unit tests

use std::sync::Arc;
use std::time::Duration;

use beacon_models::{ConductValue, Icon};
use devsync::app::options::EngineOptions;
use devsync::app::run::DeviceEngine;
use devsync::display::DEFAULT_HIGHLIGHT;
use devsync::errors::SyncError;
use serde_json::json;
use tokio::time::sleep;

use crate::common::{assert_near, device, FakeGateway, RecordingSink};

fn activate(
    alias: &str,
    gateway: &Arc<FakeGateway>,
    options: EngineOptions,
) -> (DeviceEngine, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let engine = DeviceEngine::activate(
        device(alias),
        None,
        options,
        gateway.clone(),
        sink.clone(),
    );
    (engine, sink)
}

#[tokio::test(start_paused = true)]
async fn test_light_end_to_end() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")).following_commands());
    let (engine, sink) = activate("Kitchen Light", &gateway, EngineOptions::default());

    assert_eq!(engine.icon(), Some(Icon::Light));
    assert_eq!(engine.display_name(), "Kitchen Light");
    assert!(engine.is_actionable());
    assert!(!engine.is_active());
    assert!(engine.highlight(None).is_none());

    sleep(Duration::from_millis(100)).await;
    assert!(engine.is_active());
    let highlight = engine.highlight(None).unwrap();
    assert_eq!(highlight.background, DEFAULT_HIGHLIGHT);
    assert_eq!(highlight.foreground, "#333");

    assert_eq!(engine.toggle(), Some(ConductValue::Off));
    sleep(Duration::from_millis(400)).await;
    assert!(!engine.is_active());

    let conducts = gateway.conducts();
    assert_eq!(conducts.len(), 1);
    assert_eq!(conducts[0].target.identifier, "kitchen-light-id");
    assert_eq!(conducts[0].target.channel, "main");
    assert_eq!(conducts[0].target.contact, "state");
    assert_eq!(conducts[0].value, ConductValue::Off);

    let changes: Vec<bool> = sink.changes().iter().map(|c| c.is_active).collect();
    assert_eq!(changes, vec![true, false]);

    engine.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_polls_immediately_then_every_interval() {
    let gateway = Arc::new(FakeGateway::new(json!("OFF")));
    let (_engine, _sink) = activate("Kitchen Light", &gateway, EngineOptions::default());

    sleep(Duration::from_millis(6500)).await;

    let times = gateway.state_call_times();
    assert_eq!(times.len(), 3);
    for (actual, expected) in times.into_iter().zip([0, 3000, 6000]) {
        assert_near(actual, expected);
    }
    assert!(gateway
        .state_calls()
        .iter()
        .all(|(contact, _)| contact == "state"));
}

#[tokio::test(start_paused = true)]
async fn test_device_without_active_contact_is_inert() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")));
    let (engine, sink) = activate("Thermostat", &gateway, EngineOptions::default());

    assert_eq!(engine.icon(), None);
    assert_eq!(engine.display_name(), "Thermostat");
    assert!(!engine.is_actionable());
    assert_eq!(engine.toggle(), None);

    sleep(Duration::from_millis(7000)).await;

    assert!(gateway.state_calls().is_empty());
    assert!(gateway.conducts().is_empty());
    assert!(sink.changes().is_empty());
    assert!(!engine.is_active());
}

#[tokio::test(start_paused = true)]
async fn test_motion_sensor_tracks_occupancy() {
    let gateway = Arc::new(FakeGateway::new(json!(true)));
    let (engine, _sink) = activate("Hallway Motion Light", &gateway, EngineOptions::default());

    assert_eq!(engine.icon(), Some(Icon::Motion));
    assert!(!engine.is_actionable());

    sleep(Duration::from_millis(100)).await;
    assert!(engine.is_active());
    assert_eq!(gateway.state_calls()[0].0, "occupancy");

    assert_eq!(engine.toggle(), None);
    assert!(gateway.conducts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_toggle_confirms_on_schedule() {
    let gateway = Arc::new(FakeGateway::new(json!("OFF")).following_commands());
    let (engine, _sink) = activate("Kitchen Light", &gateway, EngineOptions::default());

    sleep(Duration::from_millis(100)).await;
    assert_eq!(engine.toggle(), Some(ConductValue::On));

    sleep(Duration::from_millis(1900)).await;

    let conducts = gateway.conducts();
    assert_eq!(conducts.len(), 1);
    assert_eq!(conducts[0].value, ConductValue::On);

    let times = gateway.state_call_times();
    assert_eq!(times.len(), 6);
    for (actual, expected) in times.into_iter().zip([0, 300, 500, 700, 900, 1100]) {
        assert_near(actual, expected);
    }
    assert!(engine.is_active());
}

#[tokio::test(start_paused = true)]
async fn test_toggle_uses_cached_state() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")));
    let (engine, _sink) = activate("Kitchen Light", &gateway, EngineOptions::default());

    // Nothing reconciled yet, the cached state is still inactive
    assert_eq!(engine.toggle(), Some(ConductValue::On));

    sleep(Duration::from_millis(100)).await;
    assert_eq!(engine.toggle(), Some(ConductValue::Off));

    sleep(Duration::from_millis(10)).await;
    let values: Vec<ConductValue> = gateway.conducts().iter().map(|c| c.value).collect();
    assert_eq!(values, vec![ConductValue::On, ConductValue::Off]);
}

#[tokio::test(start_paused = true)]
async fn test_deactivate_cancels_confirmation() {
    let gateway = Arc::new(FakeGateway::new(json!("OFF")));
    let (engine, _sink) = activate("Kitchen Light", &gateway, EngineOptions::default());

    sleep(Duration::from_millis(100)).await;
    engine.toggle();
    sleep(Duration::from_millis(300)).await;
    engine.deactivate();
    assert!(engine.is_deactivated());

    sleep(Duration::from_millis(10_000)).await;

    let times = gateway.state_call_times();
    assert_eq!(times.len(), 2);
    assert_near(times[0], 0);
    assert_near(times[1], 300);
    assert_eq!(gateway.conducts().len(), 1);
    assert_eq!(engine.toggle(), None);
}

#[tokio::test(start_paused = true)]
async fn test_slow_check_does_not_delay_the_burst() {
    let gateway = Arc::new(FakeGateway::new(json!("OFF")));
    let (engine, _sink) = activate("Kitchen Light", &gateway, EngineOptions::default());

    sleep(Duration::from_millis(100)).await;
    gateway.set_latency(Duration::from_millis(1500));
    engine.toggle();

    sleep(Duration::from_millis(1050)).await;

    let times = gateway.state_call_times();
    assert_eq!(times.len(), 6);
    for (actual, expected) in times.into_iter().zip([0, 300, 500, 700, 900, 1100]) {
        assert_near(actual, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn test_teardown_right_after_toggle() {
    let gateway = Arc::new(FakeGateway::new(json!("OFF")));
    let (engine, _sink) = activate("Kitchen Light", &gateway, EngineOptions::default());

    sleep(Duration::from_millis(100)).await;
    assert_eq!(engine.toggle(), Some(ConductValue::On));
    engine.deactivate();

    sleep(Duration::from_millis(5000)).await;

    // Only the first poll reached the gateway, no confirmation ran
    assert_eq!(gateway.state_call_times().len(), 1);

    // The command itself was already issued and still goes out
    let conducts = gateway.conducts();
    assert_eq!(conducts.len(), 1);
    assert_eq!(conducts[0].value, ConductValue::On);
}

#[tokio::test(start_paused = true)]
async fn test_late_result_is_dropped() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")));
    gateway.set_latency(Duration::from_millis(500));
    let (engine, sink) = activate("Kitchen Light", &gateway, EngineOptions::default());

    sleep(Duration::from_millis(100)).await;
    engine.deactivate();

    sleep(Duration::from_millis(1000)).await;
    assert_eq!(gateway.state_calls().len(), 1);
    assert!(!engine.is_active());
    assert!(sink.changes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_joins_workers() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")));
    let (engine, _sink) = activate("Kitchen Light", &gateway, EngineOptions::default());

    sleep(Duration::from_millis(100)).await;
    assert!(engine.shutdown().await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_times_out_on_busy_worker() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")));
    gateway.set_latency(Duration::from_secs(10));
    let options = EngineOptions {
        max_shutdown_delay: Duration::from_secs(1),
        ..Default::default()
    };
    let (engine, _sink) = activate("Kitchen Light", &gateway, options);

    sleep(Duration::from_millis(100)).await;
    let result = engine.shutdown().await;
    assert!(matches!(result, Err(SyncError::ShutdownError(_))));
}

#[tokio::test(start_paused = true)]
async fn test_failure_keeps_last_state() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")));
    let (engine, sink) = activate("Kitchen Light", &gateway, EngineOptions::default());

    sleep(Duration::from_millis(100)).await;
    assert!(engine.is_active());

    gateway.fail_state();
    sleep(Duration::from_millis(6000)).await;

    assert_eq!(gateway.state_calls().len(), 3);
    assert!(engine.is_active());
    assert_eq!(sink.changes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_changes() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")));
    let (engine, _sink) = activate("Kitchen Light", &gateway, EngineOptions::default());
    let mut snapshots = engine.subscribe();

    snapshots.changed().await.unwrap();
    assert!(snapshots.borrow_and_update().is_active);

    // Same reading on the next tick, nothing to notify
    sleep(Duration::from_millis(3500)).await;
    assert!(!snapshots.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_drop_stops_polling() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")));
    let (engine, _sink) = activate("Kitchen Light", &gateway, EngineOptions::default());

    sleep(Duration::from_millis(100)).await;
    drop(engine);

    sleep(Duration::from_millis(10_000)).await;
    assert_eq!(gateway.state_calls().len(), 1);
}
