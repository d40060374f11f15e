//! Configuration types for the access URL updater

use serde::{Deserialize, Serialize};

use crate::access_url::Capitalization;
use crate::select::AddrPreference;

/// Discovery domain used when none is configured
pub const DEFAULT_DISCOVERY_DOMAIN: &str = "plex.direct";

/// Base URL of the discovery API used when none is configured
pub const DEFAULT_DISCOVERY_URL: &str = "https://plex.tv/api";

/// Updater configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// Which candidate address(es) to publish
    #[serde(default)]
    pub addr_preference: AddrPreference,

    /// Letter case of the dashed address label
    #[serde(default)]
    pub capitalization: Capitalization,

    /// Discovery domain the published URLs live under (e.g. `plex.direct`)
    #[serde(default = "default_discovery_domain")]
    pub discovery_domain: String,

    /// Compute and report the new value without writing it
    #[serde(default)]
    pub dry_run: bool,

    /// Capacity of the updater event channel
    ///
    /// When full, further events are dropped with a warning.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl UpdaterConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            addr_preference: AddrPreference::default(),
            capitalization: Capitalization::default(),
            discovery_domain: default_discovery_domain(),
            dry_run: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    pub fn with_addr_preference(mut self, addr_preference: AddrPreference) -> Self {
        self.addr_preference = addr_preference;
        self
    }

    pub fn with_capitalization(mut self, capitalization: Capitalization) -> Self {
        self.capitalization = capitalization;
        self
    }

    pub fn with_discovery_domain(mut self, discovery_domain: impl Into<String>) -> Self {
        self.discovery_domain = discovery_domain.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        let domain = self.discovery_domain.as_str();
        if domain.is_empty() {
            return Err(crate::Error::config("Discovery domain cannot be empty"));
        }
        if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
            return Err(crate::Error::config(format!(
                "Discovery domain '{}' has an empty label",
                domain
            )));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_discovery_domain() -> String {
    DEFAULT_DISCOVERY_DOMAIN.to_string()
}

fn default_event_channel_capacity() -> usize {
    16
}
