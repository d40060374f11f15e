// # Preferences Store Trait
//
// Where the server's preferences live: either the running server's API or
// its preferences file on disk.
//
// ## Implementations
//
// - Server HTTP API: `v6access-plex` crate
// - Preferences file: [`crate::state::ConfigFileStore`]
// - In-memory: [`crate::state::MemoryPreferencesStore`]

use async_trait::async_trait;

use crate::preferences::Preferences;

/// Trait for preference store implementations
///
/// The only mutation a store ever performs is replacing the custom access
/// URL value; every other preference is left untouched.
#[async_trait]
pub trait PreferencesStore: Send + Sync {
    /// Identifier the server is registered under with the discovery service
    async fn device_identifier(&self) -> Result<String, crate::Error>;

    /// Read the full preferences mapping
    async fn fetch_preferences(&self) -> Result<Preferences, crate::Error>;

    /// Replace the comma-joined custom access URL value
    async fn update_custom_connections(&self, value: &str) -> Result<(), crate::Error>;

    /// Get the store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}
