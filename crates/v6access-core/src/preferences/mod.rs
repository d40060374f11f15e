// # Preferences
//
// A schema-less, ordered attribute bag holding every attribute of a
// preferences document. Unknown attributes are kept verbatim so that a
// decode -> modify -> encode cycle never drops operator settings.
//
// The well-known subset is described by a rule table in [`validate`] and
// checked on demand rather than baked into a fixed record type.

pub mod codec;
pub mod validate;

use indexmap::IndexMap;
use std::fmt;

pub use codec::{ROOT_ELEMENT, XML_HEADER};

/// Well-known preference keys
pub mod keys {
    /// Raw device identifier (UUID v4)
    pub const MACHINE_IDENTIFIER: &str = "MachineIdentifier";
    /// 40 character hexadecimal identifier used for remote device lookup
    pub const PROCESSED_MACHINE_IDENTIFIER: &str = "ProcessedMachineIdentifier";
    /// Access token for the remote services
    pub const ONLINE_TOKEN: &str = "PlexOnlineToken";
    /// `"1"` when the port is mapped manually
    pub const MANUAL_PORT_MAPPING_MODE: &str = "ManualPortMappingMode";
    /// Manually mapped external port
    pub const MANUAL_PORT_MAPPING_PORT: &str = "ManualPortMappingPort";
    /// Last port learned through automatic port mapping
    pub const LAST_AUTOMATIC_MAPPED_PORT: &str = "LastAutomaticMappedPort";
    /// Comma-joined custom access URLs
    pub const CUSTOM_CONNECTIONS: &str = "customConnections";
}

/// Boolean-true sentinel used by preference values
pub const BOOL_TRUE: &str = "1";

/// Boolean-false sentinel used by preference values
pub const BOOL_FALSE: &str = "0";

/// Ordered key -> value mapping of preference attributes
///
/// Keys are case-sensitive and unique; inserting an existing key replaces
/// its value in place and keeps its position.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    attributes: IndexMap<String, String>,
}

impl Preferences {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Insert or replace a value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.attributes.insert(key.into(), value.into())
    }

    /// Remove a key, keeping the relative order of the remaining keys
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.attributes.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterate attributes in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Access token, if present
    pub fn token(&self) -> Option<&str> {
        self.get(keys::ONLINE_TOKEN)
    }

    /// Identifier used to look the server up in the remote device list
    pub fn processed_machine_identifier(&self) -> Option<&str> {
        self.get(keys::PROCESSED_MACHINE_IDENTIFIER)
    }

    /// Raw comma-joined custom access URL value
    pub fn custom_connections(&self) -> Option<&str> {
        self.get(keys::CUSTOM_CONNECTIONS)
    }

    /// Replace the custom access URL value
    pub fn set_custom_connections(&mut self, value: impl Into<String>) {
        self.insert(keys::CUSTOM_CONNECTIONS, value);
    }
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(key, value)| {
                if key == keys::ONLINE_TOKEN {
                    (key, "<REDACTED>")
                } else {
                    (key, value)
                }
            }))
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Preferences {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut preferences = Self::new();
        preferences.extend(iter);
        preferences
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Preferences {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
