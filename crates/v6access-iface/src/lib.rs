// # Interface Address Source
//
// Reads the IPv6 addresses assigned to one network interface.
//
// ## Filtering
//
// Only addresses that can be reached from the internet are returned:
//
// - IPv4 and IPv4-mapped (`::ffff:0:0/96`) addresses are skipped
// - Unspecified, loopback and multicast addresses are skipped
// - Link-local (`fe80::/10`) and unique-local (`fc00::/7`) addresses are skipped
//
// Addresses keep the order the operating system reports them in.

use async_trait::async_trait;
use std::net::{IpAddr, Ipv6Addr};
use v6access_core::traits::AddressSource;
use v6access_core::{Error, Result};

/// IPv6 address source for a named interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddressSource {
    interface: String,
}

impl InterfaceAddressSource {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

#[async_trait]
impl AddressSource for InterfaceAddressSource {
    async fn addresses(&self) -> Result<Vec<Ipv6Addr>> {
        let interfaces = tokio::task::spawn_blocking(get_if_addrs::get_if_addrs)
            .await
            .map_err(|e| Error::Other(format!("Interface enumeration task failed: {}", e)))?
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to list network interfaces: {}", e),
                ))
            })?;

        let addresses = global_ipv6_addresses(
            &self.interface,
            interfaces.iter().map(|iface| (iface.name.as_str(), iface.ip())),
        )?;

        tracing::debug!(
            "Found {} global IPv6 address(es) on {}",
            addresses.len(),
            self.interface
        );
        Ok(addresses)
    }

    fn source_name(&self) -> &'static str {
        "interface"
    }
}

/// Global-unicast, non-private IPv6 addresses assigned to `interface`
///
/// `assignments` yields `(interface name, address)` pairs; an interface
/// with several addresses appears once per address.
pub fn global_ipv6_addresses<'a>(
    interface: &str,
    assignments: impl IntoIterator<Item = (&'a str, IpAddr)>,
) -> Result<Vec<Ipv6Addr>> {
    let mut seen_interface = false;
    let mut addresses = Vec::new();

    for (name, ip) in assignments {
        if name != interface {
            continue;
        }
        seen_interface = true;

        if let IpAddr::V6(v6) = ip {
            if is_global_unicast(&v6) && !addresses.contains(&v6) {
                addresses.push(v6);
            }
        }
    }

    if !seen_interface {
        return Err(Error::not_found(format!("no such interface: {}", interface)));
    }
    if addresses.is_empty() {
        return Err(Error::not_found(format!(
            "no global unicast IPv6 address found on interface: {}",
            interface
        )));
    }
    Ok(addresses)
}

/// Whether `addr` is a publicly routable unicast IPv6 address
pub fn is_global_unicast(addr: &Ipv6Addr) -> bool {
    let first = addr.segments()[0];

    !(addr.to_ipv4_mapped().is_some()
        || addr.is_unspecified()
        || addr.is_loopback()
        || addr.is_multicast()
        // fe80::/10
        || (first & 0xffc0) == 0xfe80
        // fc00::/7
        || (first & 0xfe00) == 0xfc00)
}
