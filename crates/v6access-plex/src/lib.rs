// # Plex API Client
//
// HTTP client for the media server's local API and the discovery service's
// resource listing. Both speak the same XML dialect and authenticate with
// the same token header, so one client type serves both roles: point it at
// the server to use it as a PreferencesStore, or at the discovery API to use
// it as a DiscoveryService.
//
// ## Behavior
//
// - One HTTP request per call, no retries, no caching
// - Any non-2xx response fails with `Error::Http` (status, reason, URL)
// - Transport failures fail with `Error::Provider`
// - The token travels in the `X-Plex-Token` header only, never in a URL,
//   log line or Debug output
//
// ## Endpoints
//
// Paths are appended to the configured base URL's path.
//
// - Identity: GET `/identity`
// - Resources: GET `/resources?includeHttps=1&includeIPv6=1`
// - Preferences: GET `/:/prefs`
// - Update: PUT `/:/prefs?customConnections=<value>`

mod dto;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;
use v6access_core::device::Device;
use v6access_core::preferences::{BOOL_TRUE, Preferences, keys};
use v6access_core::traits::{DiscoveryService, PreferencesStore};
use v6access_core::{Error, Result};

use dto::{IdentityContainer, ResourcesContainer, SettingsContainer};

/// Header carrying the access token
pub const TOKEN_HEADER: &str = "X-Plex-Token";

/// Default HTTP timeout for API requests
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

const IDENTITY_PATH: &[&str] = &["identity"];
const RESOURCES_PATH: &[&str] = &["resources"];
const PREFERENCES_PATH: &[&str] = &[":", "prefs"];

const PROVIDER_NAME: &str = "plex";

/// Client for one Plex API base URL
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the token.
#[derive(Clone)]
pub struct PlexApiClient {
    /// Base URL, e.g. `http://127.0.0.1:32400` or `https://plex.tv/api`
    base_url: Url,

    /// Access token
    /// ⚠️ NEVER log this value
    token: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the token
impl std::fmt::Debug for PlexApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlexApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl PlexApiClient {
    /// Create a client for `base_url`
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the URL does not parse, cannot carry a path,
    ///   or the token is empty
    /// - `Error::Provider` if the HTTP client cannot be built
    pub fn new(base_url: &str, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::config(format!("Invalid API URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!("API URL '{}' cannot have a path", base_url)));
        }

        let token = token.into();
        if token.is_empty() {
            return Err(Error::config("Plex token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            token,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Identifier the server reports for itself
    pub async fn machine_identifier(&self) -> Result<String> {
        let url = self.endpoint(IDENTITY_PATH, &[])?;
        let identity: IdentityContainer = self.request_xml(Method::GET, url).await?;

        if identity.machine_identifier.is_empty() {
            return Err(Error::not_found("identity response has no machineIdentifier"));
        }
        Ok(identity.machine_identifier)
    }

    /// Devices visible to the token, including HTTPS and IPv6 connections
    pub async fn resources(&self) -> Result<Vec<Device>> {
        let url = self.endpoint(
            RESOURCES_PATH,
            &[("includeHttps", BOOL_TRUE), ("includeIPv6", BOOL_TRUE)],
        )?;
        let resources: ResourcesContainer = self.request_xml(Method::GET, url).await?;
        Ok(resources.devices)
    }

    /// Server settings as an id -> value mapping
    pub async fn settings(&self) -> Result<Preferences> {
        let url = self.endpoint(PREFERENCES_PATH, &[])?;
        let settings: SettingsContainer = self.request_xml(Method::GET, url).await?;
        Ok(settings.into_preferences())
    }

    /// Replace the server's custom access URLs
    pub async fn set_custom_connections(&self, value: &str) -> Result<()> {
        let url = self.endpoint(PREFERENCES_PATH, &[(keys::CUSTOM_CONNECTIONS, value)])?;
        self.request(Method::PUT, url).await?;
        Ok(())
    }

    /// Base URL with `segments` appended to its path and `query` set
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::config(format!("API URL '{}' cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn request_xml<T: DeserializeOwned>(&self, method: Method, url: Url) -> Result<T> {
        let display_url = url.to_string();
        let body = self.request(method, url).await?;

        quick_xml::de::from_str(&body).map_err(|e| {
            Error::parse(format!("Failed to parse response from {}: {}", display_url, e))
        })
    }

    /// Send one request and return the body of a 2xx response
    async fn request(&self, method: Method, url: Url) -> Result<String> {
        let display_url = url.to_string();
        tracing::debug!("{} {}", method, display_url);

        let response = self
            .client
            .request(method, url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| {
                Error::provider(
                    PROVIDER_NAME,
                    format!("HTTP request to {} failed: {}", display_url, e.without_url()),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                display_url,
            ));
        }

        response.text().await.map_err(|e| {
            Error::provider(
                PROVIDER_NAME,
                format!("Failed to read response from {}: {}", display_url, e.without_url()),
            )
        })
    }
}

#[async_trait]
impl DiscoveryService for PlexApiClient {
    async fn fetch_devices(&self) -> Result<Vec<Device>> {
        self.resources().await
    }

    fn service_name(&self) -> &'static str {
        "plex-discovery"
    }
}

#[async_trait]
impl PreferencesStore for PlexApiClient {
    async fn device_identifier(&self) -> Result<String> {
        self.machine_identifier().await
    }

    async fn fetch_preferences(&self) -> Result<Preferences> {
        self.settings().await
    }

    async fn update_custom_connections(&self, value: &str) -> Result<()> {
        self.set_custom_connections(value).await
    }

    fn store_name(&self) -> &'static str {
        "plex-server"
    }
}
