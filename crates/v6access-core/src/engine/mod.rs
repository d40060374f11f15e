//! One-shot access URL updater
//!
//! The AccessUrlUpdater is responsible for:
//! - Picking the addresses to publish from the candidates
//! - Locating this server in the discovery service's device listing
//! - Reconciling the server's custom access URL list
//! - Writing the new list back when it changed
//!
//! ## Flow
//!
//! ```text
//! candidates ──► select ──► PreferencesStore::device_identifier
//!                                       │
//!                                       ▼
//!                     DiscoveryService::fetch_devices ──► find ──► hostname
//!                                                                    │
//!                                                                    ▼
//!             PreferencesStore::fetch_preferences ──► port ──► reconcile
//!                                                                    │
//!                                                                    ▼
//!                               PreferencesStore::update_custom_connections
//! ```
//!
//! Every step runs once, in this order. The first failure ends the run and
//! nothing after it is attempted, so a failed run never writes.

use std::net::Ipv6Addr;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::access_url::{AccessUrlReconciler, Capitalization};
use crate::config::UpdaterConfig;
use crate::device::{discovery_hostname, find_device};
use crate::error::{Error, Result};
use crate::port::resolve_mapped_port;
use crate::preferences::keys;
use crate::select::{AddrPreference, select_addresses};
use crate::traits::{DiscoveryService, PreferencesStore};

/// Events emitted by the AccessUrlUpdater
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdaterEvent {
    /// Addresses chosen for publication
    AddressesSelected { addresses: Vec<Ipv6Addr> },

    /// Server located in the device listing
    DeviceResolved {
        identifier: String,
        discovery_hostname: String,
    },

    /// Mapped port read from the preferences
    PortResolved { port: String },

    /// Custom access URLs written
    UpdateSucceeded { previous: String, current: String },

    /// Reconciled value equals the stored one, nothing written
    UpdateSkipped { current: String },

    /// Dry run, nothing written
    DryRun { previous: String, proposed: String },

    /// Run aborted
    UpdateFailed { error: String },
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The store now holds `current`
    Updated { previous: String, current: String },

    /// The store already held the reconciled value
    Unchanged { current: String },

    /// `proposed` would have been written
    DryRun { previous: String, proposed: String },
}

impl UpdateOutcome {
    /// The custom access URL value after this run
    pub fn value(&self) -> &str {
        match self {
            UpdateOutcome::Updated { current, .. } => current,
            UpdateOutcome::Unchanged { current } => current,
            UpdateOutcome::DryRun { proposed, .. } => proposed,
        }
    }
}

/// One-shot custom access URL updater
///
/// ## Lifecycle
///
/// 1. Create with [`AccessUrlUpdater::new()`]
/// 2. Call [`AccessUrlUpdater::run()`] with the candidate addresses
/// 3. Drain the event receiver if you care about progress
///
/// `run` may be called again; reconciling is idempotent, so a second run
/// with the same inputs reports [`UpdateOutcome::Unchanged`].
pub struct AccessUrlUpdater {
    /// Discovery service for the device listing
    discovery: Box<dyn DiscoveryService>,

    /// Where the server's preferences live
    store: Box<dyn PreferencesStore>,

    addr_preference: AddrPreference,

    capitalization: Capitalization,

    reconciler: AccessUrlReconciler,

    dry_run: bool,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<UpdaterEvent>,
}

impl AccessUrlUpdater {
    /// Create a new updater
    ///
    /// # Returns
    ///
    /// A tuple of (updater, event_receiver) where event_receiver yields updater events
    pub fn new(
        discovery: Box<dyn DiscoveryService>,
        store: Box<dyn PreferencesStore>,
        config: UpdaterConfig,
    ) -> Result<(Self, mpsc::Receiver<UpdaterEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let updater = Self {
            discovery,
            store,
            addr_preference: config.addr_preference,
            capitalization: config.capitalization,
            reconciler: AccessUrlReconciler::new(config.discovery_domain),
            dry_run: config.dry_run,
            event_tx: tx,
        };

        Ok((updater, rx))
    }

    /// Reconcile the store's custom access URLs against `candidates`
    pub async fn run(&self, candidates: &[Ipv6Addr]) -> Result<UpdateOutcome> {
        match self.run_steps(candidates).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.emit_event(UpdaterEvent::UpdateFailed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_steps(&self, candidates: &[Ipv6Addr]) -> Result<UpdateOutcome> {
        let addresses = select_addresses(candidates, self.addr_preference)?;
        debug!(
            "Selected {} of {} candidate address(es) using '{}'",
            addresses.len(),
            candidates.len(),
            self.addr_preference
        );
        self.emit_event(UpdaterEvent::AddressesSelected {
            addresses: addresses.clone(),
        });

        let identifier = self.store.device_identifier().await?;
        debug!("Device identifier from {}: {}", self.store.store_name(), identifier);

        let devices = self.discovery.fetch_devices().await?;
        debug!(
            "{} listed {} device(s)",
            self.discovery.service_name(),
            devices.len()
        );

        let device = find_device(&devices, &identifier)?;
        let hostname = discovery_hostname(device, self.reconciler.discovery_domain())?;
        info!("Found device '{}' at {}", device.name, hostname);
        self.emit_event(UpdaterEvent::DeviceResolved {
            identifier: identifier.clone(),
            discovery_hostname: hostname.clone(),
        });

        let preferences = self.store.fetch_preferences().await?;
        let previous = preferences
            .custom_connections()
            .map(str::to_string)
            .ok_or_else(|| Error::not_found(format!("no such setting: {}", keys::CUSTOM_CONNECTIONS)))?;

        let port = resolve_mapped_port(&preferences)?;
        debug!("Mapped port: {}", port);
        self.emit_event(UpdaterEvent::PortResolved { port: port.clone() });

        let current = self.reconciler.reconcile(
            &previous,
            &hostname,
            &port,
            &addresses,
            self.capitalization,
        );

        if self.dry_run {
            info!("Dry run, would set custom access URLs to: {}", current);
            self.emit_event(UpdaterEvent::DryRun {
                previous: previous.clone(),
                proposed: current.clone(),
            });
            return Ok(UpdateOutcome::DryRun {
                previous,
                proposed: current,
            });
        }

        if current == previous {
            info!("Custom access URLs already up to date");
            self.emit_event(UpdaterEvent::UpdateSkipped {
                current: current.clone(),
            });
            return Ok(UpdateOutcome::Unchanged { current });
        }

        self.store.update_custom_connections(&current).await?;
        info!("Updated custom access URLs: {} -> {}", previous, current);
        self.emit_event(UpdaterEvent::UpdateSucceeded {
            previous: previous.clone(),
            current: current.clone(),
        });

        Ok(UpdateOutcome::Updated { previous, current })
    }

    fn emit_event(&self, event: UpdaterEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            // Receiver dropped; the caller opted out of events
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_value() {
        let updated = UpdateOutcome::Updated {
            previous: "a".to_string(),
            current: "b".to_string(),
        };
        let unchanged = UpdateOutcome::Unchanged {
            current: "c".to_string(),
        };
        let dry_run = UpdateOutcome::DryRun {
            previous: "a".to_string(),
            proposed: "d".to_string(),
        };

        assert_eq!(updated.value(), "b");
        assert_eq!(unchanged.value(), "c");
        assert_eq!(dry_run.value(), "d");
    }

    #[test]
    fn test_updater_event_clone() {
        let event = UpdaterEvent::PortResolved {
            port: "32400".to_string(),
        };
        assert_eq!(event.clone(), event);
    }
}
