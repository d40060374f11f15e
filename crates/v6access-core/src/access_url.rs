// # Custom Access URL Reconciliation
//
// The server publishes a comma-joined list of custom access URLs. IPv6
// entries this crate manages look like
//
//   https://2001-0db8-0000-0000-0000-0000-0000-0001.<server-id>.<domain>:<port>
//
// Reconciling drops every entry of that shape (whatever address it carries),
// keeps everything else verbatim and in order, and appends one fresh entry
// per selected address. Running it again with the same inputs yields the
// same list, because the previous run's entries are recognised and replaced.
//
// Recognition is purely structural: the host must contain `.<domain>`,
// split into exactly 4 dot-labels, and its first label must split into
// exactly 8 hyphen-groups that read back as an IPv6 literal. Anything that
// misses one of these checks is left alone.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;
use url::Url;

use crate::config::DEFAULT_DISCOVERY_DOMAIN;
use crate::error::{Error, Result};

const HOST_LABELS: usize = 4;
const ADDRESS_GROUPS: usize = 8;

/// Letter case of the dashed address label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Capitalization {
    #[default]
    Lower,
    Upper,
}

impl Capitalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capitalization::Lower => "lower",
            Capitalization::Upper => "upper",
        }
    }

    fn apply(&self, text: &str) -> String {
        match self {
            Capitalization::Lower => text.to_lowercase(),
            Capitalization::Upper => text.to_uppercase(),
        }
    }
}

impl FromStr for Capitalization {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lower" => Ok(Capitalization::Lower),
            "upper" => Ok(Capitalization::Upper),
            other => Err(Error::unknown_capitalization(other)),
        }
    }
}

impl TryFrom<String> for Capitalization {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Capitalization> for String {
    fn from(value: Capitalization) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Capitalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully expanded address with every `:` replaced by `-`
pub fn dashed_ipv6(addr: &Ipv6Addr, capitalization: Capitalization) -> String {
    let expanded = addr
        .segments()
        .iter()
        .map(|segment| format!("{:04x}", segment))
        .collect::<Vec<_>>()
        .join(":");

    capitalization.apply(&expanded.replace(':', "-"))
}

/// Build `https://<dashed-ipv6>.<hostname>:<port>`
pub fn build_access_url(
    addr: &Ipv6Addr,
    discovery_hostname: &str,
    port: &str,
    capitalization: Capitalization,
) -> String {
    let host = format!("{}.{}", dashed_ipv6(addr, capitalization), discovery_hostname);
    format!("https://{}", join_host_port(&host, port))
}

fn join_host_port(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Rebuilds custom access URL lists for one discovery domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessUrlReconciler {
    discovery_domain: String,
}

impl AccessUrlReconciler {
    /// Create a reconciler for `discovery_domain`, e.g. `plex.direct`
    pub fn new(discovery_domain: impl Into<String>) -> Self {
        Self {
            discovery_domain: discovery_domain.into(),
        }
    }

    pub fn discovery_domain(&self) -> &str {
        &self.discovery_domain
    }

    /// Whether `entry` is an IPv6 discovery URL that reconciling replaces
    pub fn is_stale(&self, entry: &str) -> bool {
        let Ok(url) = Url::parse(entry) else {
            return false;
        };
        let Some(host) = url.host_str() else {
            return false;
        };
        if !host.contains(&format!(".{}", self.discovery_domain)) {
            return false;
        }

        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() != HOST_LABELS {
            return false;
        }

        let groups: Vec<&str> = labels[0].split('-').collect();
        if groups.len() != ADDRESS_GROUPS {
            return false;
        }

        groups.join(":").parse::<Ipv6Addr>().is_ok()
    }

    /// Rebuild the comma-joined custom access URL value
    ///
    /// Empty entries and stale IPv6 discovery URLs are dropped; all other
    /// entries keep their text and relative order. One URL per address in
    /// `addresses` is appended, in order.
    pub fn reconcile(
        &self,
        existing: &str,
        discovery_hostname: &str,
        port: &str,
        addresses: &[Ipv6Addr],
        capitalization: Capitalization,
    ) -> String {
        let retained = existing
            .split(',')
            .filter(|entry| !entry.is_empty() && !self.is_stale(entry))
            .map(str::to_string);

        let fresh = addresses
            .iter()
            .map(|addr| build_access_url(addr, discovery_hostname, port, capitalization));

        retained.chain(fresh).collect::<Vec<_>>().join(",")
    }
}

impl Default for AccessUrlReconciler {
    fn default() -> Self {
        Self::new(DEFAULT_DISCOVERY_DOMAIN)
    }
}
