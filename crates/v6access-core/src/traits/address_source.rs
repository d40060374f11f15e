// # Address Source Trait
//
// Enumerates the IPv6 addresses that may be published.
//
// ## Implementations
//
// - Interface enumeration: `v6access-iface` crate

use async_trait::async_trait;
use std::net::Ipv6Addr;

/// Trait for address source implementations
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Global-unicast IPv6 candidates, in the order the system reports them
    ///
    /// Implementations return an error instead of an empty list.
    async fn addresses(&self) -> Result<Vec<Ipv6Addr>, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
