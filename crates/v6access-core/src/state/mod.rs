// # Preferences Store Implementations
//
// Local implementations of the PreferencesStore trait. The server's HTTP
// API store lives in the `v6access-plex` crate.

pub mod file;
pub mod memory;

pub use file::{ConfigFile, ConfigFileStore};
pub use memory::MemoryPreferencesStore;
