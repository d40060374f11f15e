//! Selection of the candidate addresses to publish

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Which interface address(es) to publish when several are found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AddrPreference {
    /// Only the first address
    #[default]
    First,
    /// Only the last address
    Last,
    /// Every address, in interface order
    All,
}

impl AddrPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddrPreference::First => "first",
            AddrPreference::Last => "last",
            AddrPreference::All => "all",
        }
    }
}

impl FromStr for AddrPreference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first" => Ok(AddrPreference::First),
            "last" => Ok(AddrPreference::Last),
            "all" => Ok(AddrPreference::All),
            other => Err(Error::unknown_preference(other)),
        }
    }
}

impl TryFrom<String> for AddrPreference {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<AddrPreference> for String {
    fn from(value: AddrPreference) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AddrPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply `preference` to the candidate addresses
///
/// An empty candidate list is rejected rather than producing an empty
/// selection.
pub fn select_addresses(addresses: &[Ipv6Addr], preference: AddrPreference) -> Result<Vec<Ipv6Addr>> {
    let (Some(first), Some(last)) = (addresses.first(), addresses.last()) else {
        return Err(Error::empty_input("no candidate IPv6 addresses to select from"));
    };

    Ok(match preference {
        AddrPreference::First => vec![*first],
        AddrPreference::Last => vec![*last],
        AddrPreference::All => addresses.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<Ipv6Addr> {
        ["2001:db8::a", "2001:db8::b", "2001:db8::c"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect()
    }

    #[test]
    fn test_select_first() {
        let addrs = candidates();
        assert_eq!(select_addresses(&addrs, AddrPreference::First).unwrap(), vec![addrs[0]]);
    }

    #[test]
    fn test_select_last() {
        let addrs = candidates();
        assert_eq!(select_addresses(&addrs, AddrPreference::Last).unwrap(), vec![addrs[2]]);
    }

    #[test]
    fn test_select_all_preserves_order() {
        let addrs = candidates();
        assert_eq!(select_addresses(&addrs, AddrPreference::All).unwrap(), addrs);
    }

    #[test]
    fn test_select_single_candidate() {
        let addrs = vec!["2001:db8::1".parse().unwrap()];
        for preference in [AddrPreference::First, AddrPreference::Last, AddrPreference::All] {
            assert_eq!(select_addresses(&addrs, preference).unwrap(), addrs);
        }
    }

    #[test]
    fn test_select_empty_input() {
        for preference in [AddrPreference::First, AddrPreference::Last, AddrPreference::All] {
            assert!(matches!(
                select_addresses(&[], preference),
                Err(Error::EmptyInput(_))
            ));
        }
    }

    #[test]
    fn test_parse_preference() {
        assert_eq!("first".parse::<AddrPreference>().unwrap(), AddrPreference::First);
        assert_eq!("last".parse::<AddrPreference>().unwrap(), AddrPreference::Last);
        assert_eq!("all".parse::<AddrPreference>().unwrap(), AddrPreference::All);
        assert_eq!(AddrPreference::Last.to_string(), "last");
    }

    #[test]
    fn test_parse_unknown_preference() {
        for text in ["middle", "", "First", "ALL"] {
            let err = text.parse::<AddrPreference>().unwrap_err();
            assert!(matches!(err, Error::UnknownPreference(ref v) if v == text));
        }
    }
}
