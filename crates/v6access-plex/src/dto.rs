//! Response bodies of the server and discovery APIs
//!
//! Every response is a `MediaContainer` element whose interesting data sits
//! in attributes or in one kind of child element. Unknown attributes and
//! children are ignored.

use serde::Deserialize;
use v6access_core::device::Device;
use v6access_core::preferences::Preferences;

/// `GET /identity`
#[derive(Debug, Deserialize)]
pub(crate) struct IdentityContainer {
    #[serde(rename = "@machineIdentifier", default)]
    pub machine_identifier: String,
}

/// `GET /resources`
#[derive(Debug, Deserialize)]
pub(crate) struct ResourcesContainer {
    #[serde(rename = "Device", default)]
    pub devices: Vec<Device>,
}

/// `GET /:/prefs`
#[derive(Debug, Deserialize)]
pub(crate) struct SettingsContainer {
    #[serde(rename = "Setting", default)]
    pub settings: Vec<Setting>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Setting {
    #[serde(rename = "@id", default)]
    pub id: String,

    #[serde(rename = "@value", default)]
    pub value: String,
}

impl SettingsContainer {
    /// Settings as a preferences mapping, first occurrence of an id wins
    pub fn into_preferences(self) -> Preferences {
        let mut preferences = Preferences::new();
        for setting in self.settings {
            if !preferences.contains_key(&setting.id) {
                preferences.insert(setting.id, setting.value);
            }
        }
        preferences
    }
}
