//! Contract Test: Fail-Fast Updates
//!
//! Constraints verified:
//! - The first failing step ends the run with that step's error
//! - No collaborator call after the failing step is made
//! - A failed run never writes custom access URLs
//! - Nothing is retried
//!
//! If this test fails, a broken run could publish a partial or wrong list.

mod common;

use common::*;
use v6access_core::preferences::keys;
use v6access_core::{AccessUrlUpdater, Error, UpdaterConfig, UpdaterEvent};

#[tokio::test]
async fn empty_candidates_fail_before_any_call() {
    let log = new_call_log();
    let discovery = MockDiscovery::new(vec![server_device()], log.clone());
    let store = MockStore::new(server_preferences(""), log.clone());

    let (updater, mut event_rx) = AccessUrlUpdater::new(
        Box::new(MockDiscovery::sharing_counters_with(&discovery)),
        Box::new(MockStore::sharing_counters_with(&store)),
        UpdaterConfig::default(),
    )
    .unwrap();

    let err = updater.run(&[]).await.unwrap_err();

    assert!(matches!(err, Error::EmptyInput(_)));
    assert!(calls(&log).is_empty(), "no collaborator may be called");
    assert!(matches!(
        event_rx.try_recv(),
        Ok(UpdaterEvent::UpdateFailed { .. })
    ));
}

#[tokio::test]
async fn identifier_failure_stops_before_discovery() {
    let log = new_call_log();
    let discovery = MockDiscovery::new(vec![server_device()], log.clone());
    let store = MockStore::new(server_preferences(""), log.clone()).failing_at(FailAt::Identifier);

    let (updater, _event_rx) = AccessUrlUpdater::new(
        Box::new(MockDiscovery::sharing_counters_with(&discovery)),
        Box::new(MockStore::sharing_counters_with(&store)),
        UpdaterConfig::default(),
    )
    .unwrap();

    let err = updater.run(&[addr("2001:db8::1")]).await.unwrap_err();

    assert!(matches!(err, Error::Provider { .. }));
    assert_eq!(calls(&log), vec!["device_identifier"]);
    assert_eq!(discovery.fetch_call_count(), 0);
}

#[tokio::test]
async fn discovery_failure_is_returned_unchanged() {
    let log = new_call_log();
    let discovery = MockDiscovery::failing(log.clone());
    let store = MockStore::new(server_preferences(""), log.clone());

    let (updater, _event_rx) = AccessUrlUpdater::new(
        Box::new(MockDiscovery::sharing_counters_with(&discovery)),
        Box::new(MockStore::sharing_counters_with(&store)),
        UpdaterConfig::default(),
    )
    .unwrap();

    let err = updater.run(&[addr("2001:db8::1")]).await.unwrap_err();

    match err {
        Error::Http { status, .. } => assert_eq!(status, 401),
        other => panic!("expected HTTP error, got {other:?}"),
    }
    assert_eq!(discovery.fetch_call_count(), 1, "no retries");
    assert_eq!(calls(&log), vec!["device_identifier", "fetch_devices"]);
    assert_eq!(store.update_call_count(), 0);
}

#[tokio::test]
async fn unknown_device_is_not_found() {
    let log = new_call_log();
    let discovery = MockDiscovery::new(vec![other_device()], log.clone());
    let store = MockStore::new(server_preferences(""), log.clone());

    let (updater, _event_rx) = AccessUrlUpdater::new(
        Box::new(MockDiscovery::sharing_counters_with(&discovery)),
        Box::new(MockStore::sharing_counters_with(&store)),
        UpdaterConfig::default(),
    )
    .unwrap();

    let err = updater.run(&[addr("2001:db8::1")]).await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(err.to_string().contains(IDENTIFIER));
    assert_eq!(calls(&log), vec!["device_identifier", "fetch_devices"]);
}

#[tokio::test]
async fn device_without_discovery_hostname_is_not_found() {
    let log = new_call_log();
    let mut device = server_device();
    device.connections.truncate(1);
    let discovery = MockDiscovery::new(vec![device], log.clone());
    let store = MockStore::new(server_preferences(""), log.clone());

    let (updater, _event_rx) = AccessUrlUpdater::new(
        Box::new(MockDiscovery::sharing_counters_with(&discovery)),
        Box::new(MockStore::sharing_counters_with(&store)),
        UpdaterConfig::default(),
    )
    .unwrap();

    let err = updater.run(&[addr("2001:db8::1")]).await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(!calls(&log).contains(&"fetch_preferences"));
}

#[tokio::test]
async fn missing_custom_connections_is_not_found() {
    let log = new_call_log();
    let discovery = MockDiscovery::new(vec![server_device()], log.clone());
    let mut preferences = server_preferences("");
    preferences.remove(keys::CUSTOM_CONNECTIONS);
    let store = MockStore::new(preferences, log.clone());

    let (updater, _event_rx) = AccessUrlUpdater::new(
        Box::new(MockDiscovery::sharing_counters_with(&discovery)),
        Box::new(MockStore::sharing_counters_with(&store)),
        UpdaterConfig::default(),
    )
    .unwrap();

    let err = updater.run(&[addr("2001:db8::1")]).await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(err.to_string().contains(keys::CUSTOM_CONNECTIONS));
    assert_eq!(store.update_call_count(), 0);
}

#[tokio::test]
async fn missing_mapped_port_is_not_found() {
    let log = new_call_log();
    let discovery = MockDiscovery::new(vec![server_device()], log.clone());
    let mut preferences = server_preferences("");
    preferences.remove(keys::LAST_AUTOMATIC_MAPPED_PORT);
    let store = MockStore::new(preferences, log.clone());

    let (updater, _event_rx) = AccessUrlUpdater::new(
        Box::new(MockDiscovery::sharing_counters_with(&discovery)),
        Box::new(MockStore::sharing_counters_with(&store)),
        UpdaterConfig::default(),
    )
    .unwrap();

    let err = updater.run(&[addr("2001:db8::1")]).await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(store.update_call_count(), 0);
}

#[tokio::test]
async fn write_failure_is_returned() {
    let log = new_call_log();
    let discovery = MockDiscovery::new(vec![server_device()], log.clone());
    let store = MockStore::new(server_preferences(""), log.clone()).failing_at(FailAt::Update);

    let (updater, mut event_rx) = AccessUrlUpdater::new(
        Box::new(MockDiscovery::sharing_counters_with(&discovery)),
        Box::new(MockStore::sharing_counters_with(&store)),
        UpdaterConfig::default(),
    )
    .unwrap();

    let err = updater.run(&[addr("2001:db8::1")]).await.unwrap_err();

    assert!(matches!(err, Error::Provider { .. }));
    assert_eq!(store.update_call_count(), 1, "no retries");
    assert_eq!(store.custom_connections().as_deref(), Some(""));

    let mut last = None;
    while let Ok(event) = event_rx.try_recv() {
        last = Some(event);
    }
    assert!(matches!(last, Some(UpdaterEvent::UpdateFailed { .. })));
}
