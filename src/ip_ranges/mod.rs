//! AWS IP ranges: the published table of CIDR prefixes per AWS service, and the classifier
//! answering which service owns an address.
//!
//! The table is the JSON document AWS publishes at
//! [`DEFAULT_IP_RANGES_URL`][crate::config::DEFAULT_IP_RANGES_URL]:
//!
//! ```json
//! {
//!   "syncToken": "1640995200",
//!   "createDate": "2022-01-01-00-00-00",
//!   "prefixes": [
//!     { "ip_prefix": "3.5.0.0/19", "region": "eu-west-1", "service": "S3", "network_border_group": "eu-west-1" }
//!   ],
//!   "ipv6_prefixes": [ ... ]
//! }
//! ```
//!
//! See [`cache::IpRangesCache`] for how the document is downloaded and kept on disk.

use crate::error::Error;
use ipnetwork::{Ipv4Network, Ipv6Network};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

pub mod cache;

pub use cache::IpRangesCache;

/// Service label AWS puts on every one of its ranges in addition to the specific service
/// entries. It overlaps all the others, so it never classifies an address.
pub const AMAZON_SERVICE: &str = "AMAZON";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct IpRangeTable {
    #[serde(rename = "syncToken")]
    pub sync_token: String,
    #[serde(rename = "createDate")]
    pub create_date: String,
    pub prefixes: Vec<IpPrefix>,
    #[serde(default)]
    pub ipv6_prefixes: Vec<Ipv6Prefix>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct IpPrefix {
    pub ip_prefix: Ipv4Network,
    pub region: String,
    pub service: String,
    pub network_border_group: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Ipv6Prefix {
    pub ipv6_prefix: Ipv6Network,
    pub region: String,
    pub service: String,
    pub network_border_group: String,
}

impl IpRangeTable {
    /// Parse the published `ip-ranges.json` document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if `json` isn't an IP ranges document.
    pub fn from_slice(json: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Return the service of the first entry, in document order, whose prefix contains `ip`.
    /// Entries labelled [`AMAZON_SERVICE`] are skipped.
    ///
    /// `None` means no listed range matched. In practice that is often still EC2 (or any
    /// other address space AWS doesn't publish per service), so callers shouldn't read it as
    /// "not AWS".
    #[must_use]
    pub fn classify(&self, ip: IpAddr) -> Option<&str> {
        match ip {
            IpAddr::V4(ipv4) => self
                .prefixes
                .iter()
                .filter(|prefix| prefix.service != AMAZON_SERVICE)
                .find(|prefix| prefix.ip_prefix.contains(ipv4))
                .map(|prefix| prefix.service.as_str()),
            IpAddr::V6(ipv6) => self
                .ipv6_prefixes
                .iter()
                .filter(|prefix| prefix.service != AMAZON_SERVICE)
                .find(|prefix| prefix.ipv6_prefix.contains(ipv6))
                .map(|prefix| prefix.service.as_str()),
        }
    }
}
