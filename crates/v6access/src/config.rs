//! Environment configuration for `update-ipv6-access-url`

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use v6access_core::config::{DEFAULT_DISCOVERY_DOMAIN, DEFAULT_DISCOVERY_URL};
use v6access_core::{AddrPreference, Capitalization, UpdaterConfig};

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Application configuration
pub struct Config {
    pub interface: String,
    pub addr_preference: AddrPreference,
    pub capitalization: Capitalization,
    pub server_address: Option<String>,
    pub config_path: Option<PathBuf>,
    /// ⚠️ NEVER log this value
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub discovery_url: String,
    pub discovery_domain: String,
    pub dry_run: bool,
    pub log_level: String,
    pub log_color: bool,
}

// Custom Debug implementation that hides the token
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("interface", &self.interface)
            .field("addr_preference", &self.addr_preference)
            .field("capitalization", &self.capitalization)
            .field("server_address", &self.server_address)
            .field("config_path", &self.config_path)
            .field("token", &self.token.as_ref().map(|_| "<REDACTED>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("discovery_url", &self.discovery_url)
            .field("discovery_domain", &self.discovery_domain)
            .field("dry_run", &self.dry_run)
            .field("log_level", &self.log_level)
            .field("log_color", &self.log_color)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key -> value lookup
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let addr_preference = match var("V6ACCESS_USE") {
            Some(text) => text.parse::<AddrPreference>().map_err(|e| {
                anyhow::anyhow!("V6ACCESS_USE: {}. Valid values: first, last, all", e)
            })?,
            None => AddrPreference::default(),
        };

        let capitalization = match var("V6ACCESS_CAPITALIZATION") {
            Some(text) => text.parse::<Capitalization>().map_err(|e| {
                anyhow::anyhow!("V6ACCESS_CAPITALIZATION: {}. Valid values: lower, upper", e)
            })?,
            None => Capitalization::default(),
        };

        let timeout_secs = match var("V6ACCESS_TIMEOUT_SECS") {
            Some(text) => text.parse::<u64>().map_err(|_| {
                anyhow::anyhow!("V6ACCESS_TIMEOUT_SECS must be a whole number of seconds. Got: {}", text)
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            interface: var("V6ACCESS_INTERFACE").unwrap_or_default(),
            addr_preference,
            capitalization,
            server_address: var("V6ACCESS_SERVER_ADDRESS"),
            config_path: var("V6ACCESS_CONFIG_PATH").map(PathBuf::from),
            token: var("V6ACCESS_TOKEN"),
            timeout_secs,
            discovery_url: var("V6ACCESS_DISCOVERY_URL")
                .unwrap_or_else(|| DEFAULT_DISCOVERY_URL.to_string()),
            discovery_domain: var("V6ACCESS_DISCOVERY_DOMAIN")
                .unwrap_or_else(|| DEFAULT_DISCOVERY_DOMAIN.to_string()),
            dry_run: var("V6ACCESS_MODE").is_some_and(|mode| mode.to_lowercase() == "dry-run"),
            log_level: var("V6ACCESS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_color: var("V6ACCESS_LOG_COLOR").is_some_and(|v| is_truthy(&v)),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.interface.is_empty() {
            anyhow::bail!(
                "V6ACCESS_INTERFACE is required. \
                Set it via: export V6ACCESS_INTERFACE=eth0"
            );
        }

        if self.server_address.is_none() && self.config_path.is_none() {
            anyhow::bail!(
                "Either V6ACCESS_SERVER_ADDRESS or V6ACCESS_CONFIG_PATH must be set"
            );
        }

        if self.config_path.is_none() && self.token.is_none() {
            anyhow::bail!(
                "V6ACCESS_TOKEN is required when V6ACCESS_CONFIG_PATH is not set"
            );
        }

        if let Some(ref address) = self.server_address {
            validate_http_url("V6ACCESS_SERVER_ADDRESS", address)?;
        }
        validate_http_url("V6ACCESS_DISCOVERY_URL", &self.discovery_url)?;

        if !(1..=300).contains(&self.timeout_secs) {
            anyhow::bail!(
                "V6ACCESS_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.timeout_secs
            );
        }

        self.updater_config()
            .validate()
            .map_err(|e| anyhow::anyhow!("V6ACCESS_DISCOVERY_DOMAIN: {}", e))?;

        self.log_level()?;

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "V6ACCESS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    pub fn updater_config(&self) -> UpdaterConfig {
        UpdaterConfig::new()
            .with_addr_preference(self.addr_preference)
            .with_capitalization(self.capitalization)
            .with_discovery_domain(self.discovery_domain.clone())
            .with_dry_run(self.dry_run)
    }
}

fn validate_http_url(name: &str, url: &str) -> Result<()> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        anyhow::bail!(
            "{} must use HTTP or HTTPS scheme, e.g. http://127.0.0.1:32400. Got: {}",
            name,
            url
        );
    }
    Ok(())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
