// # v6access-core
//
// Core library for keeping a media server's IPv6 custom access URLs in sync.
//
// ## Architecture Overview
//
// - **Preferences**: Ordered attribute bag with an XML codec and validation rules
// - **DiscoveryService**: Trait for listing devices registered with the discovery service
// - **PreferencesStore**: Trait for reading preferences and writing custom access URLs
// - **AddressSource**: Trait for enumerating candidate IPv6 addresses
// - **AccessUrlReconciler**: Pure rebuild of the custom access URL list
// - **AccessUrlUpdater**: One-shot orchestration of a full update
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic never touches the network or the OS
// 2. **Fail Fast**: A run stops at the first error and never writes after one
// 3. **Idempotency**: Re-running with the same inputs leaves the list unchanged
// 4. **Library-First**: All core functionality can be used as a library

pub mod access_url;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod port;
pub mod preferences;
pub mod select;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use access_url::{AccessUrlReconciler, Capitalization, build_access_url, dashed_ipv6};
pub use config::UpdaterConfig;
pub use device::{Connection, Device, discovery_hostname, find_device};
pub use engine::{AccessUrlUpdater, UpdateOutcome, UpdaterEvent};
pub use error::{Error, Result};
pub use port::resolve_mapped_port;
pub use preferences::Preferences;
pub use select::{AddrPreference, select_addresses};
pub use state::{ConfigFile, ConfigFileStore, MemoryPreferencesStore};
pub use traits::{AddressSource, DiscoveryService, PreferencesStore};
