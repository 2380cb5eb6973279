//! Historical sampling unit tests

use std::sync::Arc;
use std::time::Duration;

use beacon_models::HistoricalValue;
use chrono::Utc;
use devsync::app::options::EngineOptions;
use devsync::app::run::DeviceEngine;
use devsync::app::state::DeviceState;
use devsync::sync::sampler::{HistoricalSampler, SampleOutcome};
use devsync::workers::history;
use serde_json::json;
use tokio::time::sleep;

use crate::common::{assert_near, climate_light, contact, device, FakeGateway, RecordingSink};

fn sampler(gateway: &Arc<FakeGateway>) -> (HistoricalSampler, Arc<DeviceState>) {
    let state = Arc::new(DeviceState::new());
    let sampler = HistoricalSampler::new(
        "bedroom-light".to_string(),
        contact("temperature", "double"),
        Duration::from_secs(3600),
        10.0,
        gateway.clone(),
        state.clone(),
    );
    (sampler, state)
}

fn history_enabled() -> EngineOptions {
    EngineOptions {
        history: history::Options {
            enabled: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_sample_rescales_last_hour() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")));
    let time_stamp = Utc::now();
    gateway.set_history(vec![HistoricalValue {
        time_stamp,
        value: 123.0,
    }]);
    let (sampler, state) = sampler(&gateway);

    assert_eq!(sampler.sample().await, SampleOutcome::Updated(1));

    let data = state.historical_data();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].time_stamp, time_stamp);
    assert!((data[0].value - 12.3).abs() < 1e-9);

    let calls = gateway.history_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].contact, "temperature");
    assert_eq!(calls[0].end - calls[0].start, chrono::Duration::hours(1));
}

#[tokio::test]
async fn test_failure_keeps_previous_series() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")));
    gateway.set_history(vec![
        HistoricalValue {
            time_stamp: Utc::now(),
            value: 200.0,
        },
        HistoricalValue {
            time_stamp: Utc::now(),
            value: 210.0,
        },
    ]);
    let (sampler, state) = sampler(&gateway);
    sampler.sample().await;

    gateway.fail_history();
    assert_eq!(sampler.sample().await, SampleOutcome::Failed);

    let values: Vec<f64> = state.historical_data().iter().map(|s| s.value).collect();
    assert_eq!(values, vec![20.0, 21.0]);
}

#[tokio::test]
async fn test_closed_state_skips_sampling() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")));
    let (sampler, state) = sampler(&gateway);
    state.close();

    assert_eq!(sampler.sample().await, SampleOutcome::Skipped);
    assert!(gateway.history_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_engine_samples_after_one_interval() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")));
    let engine = DeviceEngine::activate(
        climate_light(),
        None,
        history_enabled(),
        gateway.clone(),
        Arc::new(RecordingSink::default()),
    );
    assert_eq!(engine.sampled_contact().unwrap().name, "temperature");

    sleep(Duration::from_millis(9000)).await;
    assert!(gateway.history_calls().is_empty());

    sleep(Duration::from_millis(1500)).await;
    let calls = gateway.history_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].contact, "temperature");
    assert_near(calls[0].at.as_millis(), 10_000);
}

#[tokio::test(start_paused = true)]
async fn test_engine_without_numeric_contact_never_samples() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")));
    let engine = DeviceEngine::activate(
        device("Kitchen Light"),
        None,
        history_enabled(),
        gateway.clone(),
        Arc::new(RecordingSink::default()),
    );
    assert!(engine.sampled_contact().is_none());

    sleep(Duration::from_secs(25)).await;
    assert!(gateway.history_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_history_disabled_by_default() {
    let gateway = Arc::new(FakeGateway::new(json!("ON")));
    let engine = DeviceEngine::activate(
        climate_light(),
        None,
        EngineOptions::default(),
        gateway.clone(),
        Arc::new(RecordingSink::default()),
    );
    assert!(engine.sampled_contact().is_some());

    sleep(Duration::from_secs(25)).await;
    assert!(gateway.history_calls().is_empty());
}
