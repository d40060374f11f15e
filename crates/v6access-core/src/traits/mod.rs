//! Collaborator traits for the access URL updater
//!
//! The core never talks to the network or the OS directly; it is handed
//! implementations of these traits.
//!
//! - [`DiscoveryService`]: List devices registered with the discovery service
//! - [`PreferencesStore`]: Read the server's preferences and write its custom access URLs
//! - [`AddressSource`]: Enumerate candidate IPv6 addresses

pub mod address_source;
pub mod discovery;
pub mod preferences_store;

pub use address_source::AddressSource;
pub use discovery::DiscoveryService;
pub use preferences_store::PreferencesStore;
