// # Discovery Service Trait
//
// Read access to the devices registered with the discovery service.
//
// ## Implementations
//
// - HTTP client: `v6access-plex` crate
//
// ## Usage
//
// ```rust,ignore
// use v6access_core::DiscoveryService;
// use v6access_core::device::{discovery_hostname, find_device};
//
// let devices = discovery.fetch_devices().await?;
// let device = find_device(&devices, "1142ed040a27acc36ea876e8362b28464c3d240d")?;
// let hostname = discovery_hostname(device, "plex.direct")?;
// ```

use async_trait::async_trait;

use crate::device::Device;

/// Trait for discovery service implementations
///
/// Implementations make exactly one request per call and never retry;
/// a failed or non-2xx request is returned as an error.
#[async_trait]
pub trait DiscoveryService: Send + Sync {
    /// Fetch every device visible to the configured token
    async fn fetch_devices(&self) -> Result<Vec<Device>, crate::Error>;

    /// Get the service name (for logging/debugging)
    fn service_name(&self) -> &'static str;
}
