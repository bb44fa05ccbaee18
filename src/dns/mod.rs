//! Domain name handling and DNS resolution of the explored URL.
//!
//! Columbus works from the URL a user would type into a browser:
//!
//! * [`domain_name`] strips the scheme, e.g. `https://dev.api.sokker.info` becomes
//!   `dev.api.sokker.info`.
//! * [`registered_domain`] approximates the registrable domain as the last two labels of the
//!   host, e.g. `sokker.info`. No public suffix list is consulted, so `example.co.uk`
//!   comes out as `co.uk`.
//! * A [`Resolver`] looks up the domain's A records, once against a fixed recursive DNS server
//!   for the [target address][Resolver::resolve_a], and once through the system resolver for
//!   the informational [nslookup][Resolver::lookup_a] output.

use crate::error::Error;
use lazy_static::lazy_static;
use regex::Regex;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use url::Url;

pub mod resolver;

pub use resolver::TrustDnsResolver;

lazy_static! {
    // Greedy, so a doubled scheme ("https://https://host") is stripped entirely.
    static ref SCHEME_PREFIX: Regex = Regex::new(r"(?i)^.+://").unwrap();
}

/// Strip any `scheme://` prefix from `request_url`. Nothing else (port, path) is removed.
#[must_use]
pub fn domain_name(request_url: &str) -> String {
    SCHEME_PREFIX.replace(request_url, "").into_owned()
}

/// The last two dot separated labels of the URL's host.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] if `request_url` isn't an absolute URL with a host.
pub fn registered_domain(request_url: &str) -> Result<String, Error> {
    let url = Url::parse(request_url).map_err(|_| Error::InvalidUrl(request_url.to_string()))?;
    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| Error::InvalidUrl(request_url.to_string()))?;
    let labels: Vec<&str> = host.trim_end_matches('.').split('.').collect();
    Ok(labels[labels.len().saturating_sub(2)..].join("."))
}

/// Format one line of nslookup-style output for an A record.
#[must_use]
pub fn nslookup_line(domain_name: &str, ip: IpAddr) -> String {
    format!("{domain_name}. IN A {ip}\n")
}

#[allow(clippy::module_name_repetitions)]
pub type DynResolver = Arc<dyn Resolver + Send + Sync>;

#[async_trait::async_trait]
pub trait Resolver {
    /// Send one recursive `A` query for `domain_name` and return the address of the first
    /// answer, or `None` if there are no answers or the first one isn't an `A` record.
    async fn resolve_a(&self, domain_name: &str) -> Result<Option<Ipv4Addr>, Error>;

    /// Forward lookup through the system resolver, IPv4 addresses only.
    async fn lookup_a(&self, domain_name: &str) -> Result<Vec<IpAddr>, Error>;
}
