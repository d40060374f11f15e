//! Mapped port resolution

use crate::error::{Error, Result};
use crate::preferences::{BOOL_TRUE, Preferences, keys};

/// Resolve the externally mapped port from a preferences mapping
///
/// Manual mapping mode (`"1"`) selects the manual port; any other mode
/// value, or a missing mode key, selects the last automatically mapped port.
/// The selected key must be present.
pub fn resolve_mapped_port(preferences: &Preferences) -> Result<String> {
    let key = if preferences.get(keys::MANUAL_PORT_MAPPING_MODE) == Some(BOOL_TRUE) {
        keys::MANUAL_PORT_MAPPING_PORT
    } else {
        keys::LAST_AUTOMATIC_MAPPED_PORT
    };

    preferences
        .get(key)
        .map(str::to_string)
        .ok_or_else(|| Error::not_found(format!("no such setting: {}", key)))
}
