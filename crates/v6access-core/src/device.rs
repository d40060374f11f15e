//! Remote device records and discovery hostname extraction
//!
//! The record types deserialize straight from the discovery service's
//! resource listing, where every field is an XML attribute:
//!
//! ```xml
//! <Device name="MyServer" product="Media Server" clientIdentifier="1142...">
//!   <Connection protocol="https" address="203.0.113.7" uri="https://203-0-113-7.srv.plex.direct:32400" local="0"/>
//! </Device>
//! ```

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};

/// A device registered with the discovery service
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Device {
    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@product", default)]
    pub product: String,

    /// Identifier the device registered itself with
    #[serde(rename = "@clientIdentifier", default)]
    pub client_identifier: String,

    /// Connections in the order the service listed them
    #[serde(rename = "Connection", default)]
    pub connections: Vec<Connection>,
}

/// One way of reaching a device
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Connection {
    #[serde(rename = "@protocol", default)]
    pub protocol: String,

    /// Bare address, e.g. `203.0.113.7`
    #[serde(rename = "@address", default)]
    pub address: String,

    #[serde(rename = "@uri", default)]
    pub uri: String,

    /// `"1"` for local connections, `"0"` for remote ones
    #[serde(rename = "@local", default)]
    pub local: String,
}

/// Find the device registered under `identifier`
///
/// The first match wins if the listing contains duplicates.
pub fn find_device<'a>(devices: &'a [Device], identifier: &str) -> Result<&'a Device> {
    devices
        .iter()
        .find(|device| device.client_identifier == identifier)
        .ok_or_else(|| Error::not_found(format!("no such device: {}", identifier)))
}

/// Extract the `<server-id>.<discovery-domain>` hostname of a device
///
/// Takes the first connection whose URI mentions `.<discovery_domain>` and
/// strips the leading `<address with dots as hyphens>.` label from its host.
/// If the host does not start with that label it is returned unchanged.
pub fn discovery_hostname(device: &Device, discovery_domain: &str) -> Result<String> {
    let marker = format!(".{}", discovery_domain);

    let connection = device
        .connections
        .iter()
        .find(|connection| connection.uri.contains(&marker))
        .ok_or_else(|| {
            Error::not_found(format!(
                "no {} hostname found for device: {}",
                marker, device.name
            ))
        })?;

    let uri = Url::parse(&connection.uri).map_err(|e| {
        Error::parse(format!("invalid connection URI {}: {}", connection.uri, e))
    })?;
    let host = uri
        .host_str()
        .ok_or_else(|| Error::parse(format!("connection URI has no host: {}", connection.uri)))?;

    let prefix = format!("{}.", connection.address.replace('.', "-"));
    Ok(host.strip_prefix(&prefix).unwrap_or(host).to_string())
}
