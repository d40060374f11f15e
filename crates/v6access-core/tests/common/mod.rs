//! Test doubles and common utilities for updater contract tests
//!
//! The doubles record every call so tests can assert which collaborator
//! steps ran, and in what order.

#![allow(dead_code)]

use std::net::Ipv6Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use v6access_core::device::{Connection, Device};
use v6access_core::error::{Error, Result};
use v6access_core::preferences::{Preferences, keys};
use v6access_core::traits::{DiscoveryService, PreferencesStore};

pub const IDENTIFIER: &str = "1142ed040a27acc36ea876e8362b28464c3d240d";
pub const HOSTNAME: &str = "0123abcd.plex.direct";

/// Shared, ordered log of collaborator calls
pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

pub fn new_call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<&'static str> {
    log.lock().unwrap().clone()
}

pub fn addr(s: &str) -> Ipv6Addr {
    s.parse().unwrap()
}

/// The server as the discovery service lists it
pub fn server_device() -> Device {
    Device {
        name: "MyServer".to_string(),
        product: "Plex Media Server".to_string(),
        client_identifier: IDENTIFIER.to_string(),
        connections: vec![
            Connection {
                protocol: "http".to_string(),
                address: "192.168.1.10".to_string(),
                uri: "http://192.168.1.10:32400".to_string(),
                local: "1".to_string(),
            },
            Connection {
                protocol: "https".to_string(),
                address: "203.0.113.7".to_string(),
                uri: format!("https://203-0-113-7.{}:32400", HOSTNAME),
                local: "0".to_string(),
            },
        ],
    }
}

/// A device that is not the server
pub fn other_device() -> Device {
    Device {
        name: "Phone".to_string(),
        product: "Plex for iOS".to_string(),
        client_identifier: "ffffffffffffffffffffffffffffffffffffffff".to_string(),
        connections: Vec::new(),
    }
}

/// Preferences in automatic port mapping mode with the given custom URLs
pub fn server_preferences(custom_connections: &str) -> Preferences {
    [
        (keys::MACHINE_IDENTIFIER, "4f8b2c3a-9d1e-4b7f-a2c6-1e5d3f7a9b0c"),
        (keys::PROCESSED_MACHINE_IDENTIFIER, IDENTIFIER),
        (keys::ONLINE_TOKEN, "token-abc"),
        (keys::MANUAL_PORT_MAPPING_MODE, "0"),
        (keys::MANUAL_PORT_MAPPING_PORT, "32401"),
        (keys::LAST_AUTOMATIC_MAPPED_PORT, "32555"),
        (keys::CUSTOM_CONNECTIONS, custom_connections),
    ]
    .into_iter()
    .collect()
}

/// A mock DiscoveryService returning a fixed device listing
pub struct MockDiscovery {
    devices: Vec<Device>,
    fail: bool,
    fetch_call_count: Arc<AtomicUsize>,
    log: CallLog,
}

impl MockDiscovery {
    pub fn new(devices: Vec<Device>, log: CallLog) -> Self {
        Self {
            devices,
            fail: false,
            fetch_call_count: Arc::new(AtomicUsize::new(0)),
            log,
        }
    }

    /// A discovery service whose request always fails
    pub fn failing(log: CallLog) -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new(), log)
        }
    }

    pub fn fetch_call_count(&self) -> usize {
        self.fetch_call_count.load(Ordering::SeqCst)
    }

    /// Create a new MockDiscovery that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            devices: other.devices.clone(),
            fail: other.fail,
            fetch_call_count: Arc::clone(&other.fetch_call_count),
            log: Arc::clone(&other.log),
        }
    }
}

#[async_trait::async_trait]
impl DiscoveryService for MockDiscovery {
    async fn fetch_devices(&self) -> Result<Vec<Device>> {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push("fetch_devices");
        if self.fail {
            return Err(Error::http(401, "Unauthorized", "https://discovery.test/resources"));
        }
        Ok(self.devices.clone())
    }

    fn service_name(&self) -> &'static str {
        "mock-discovery"
    }
}

/// Which store call should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Nothing,
    Identifier,
    Preferences,
    Update,
}

/// A mock PreferencesStore that tracks calls
pub struct MockStore {
    identifier: String,
    preferences: Arc<Mutex<Preferences>>,
    fail_at: FailAt,
    update_call_count: Arc<AtomicUsize>,
    log: CallLog,
}

impl MockStore {
    pub fn new(preferences: Preferences, log: CallLog) -> Self {
        Self {
            identifier: IDENTIFIER.to_string(),
            preferences: Arc::new(Mutex::new(preferences)),
            fail_at: FailAt::Nothing,
            update_call_count: Arc::new(AtomicUsize::new(0)),
            log,
        }
    }

    pub fn failing_at(mut self, fail_at: FailAt) -> Self {
        self.fail_at = fail_at;
        self
    }

    pub fn with_identifier(mut self, identifier: &str) -> Self {
        self.identifier = identifier.to_string();
        self
    }

    /// Get the number of times update_custom_connections() was called
    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    pub fn custom_connections(&self) -> Option<String> {
        self.preferences
            .lock()
            .unwrap()
            .custom_connections()
            .map(str::to_string)
    }

    /// Create a new MockStore that shares state and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            identifier: other.identifier.clone(),
            preferences: Arc::clone(&other.preferences),
            fail_at: other.fail_at,
            update_call_count: Arc::clone(&other.update_call_count),
            log: Arc::clone(&other.log),
        }
    }

    fn check(&self, step: FailAt) -> Result<()> {
        if self.fail_at == step {
            return Err(Error::provider("mock-store", format!("{:?} failed", step)));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PreferencesStore for MockStore {
    async fn device_identifier(&self) -> Result<String> {
        self.log.lock().unwrap().push("device_identifier");
        self.check(FailAt::Identifier)?;
        Ok(self.identifier.clone())
    }

    async fn fetch_preferences(&self) -> Result<Preferences> {
        self.log.lock().unwrap().push("fetch_preferences");
        self.check(FailAt::Preferences)?;
        Ok(self.preferences.lock().unwrap().clone())
    }

    async fn update_custom_connections(&self, value: &str) -> Result<()> {
        self.log.lock().unwrap().push("update_custom_connections");
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.check(FailAt::Update)?;
        self.preferences.lock().unwrap().set_custom_connections(value);
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "mock-store"
    }
}
