//! Error types.

use trust_dns_client::error::ClientError;
use trust_dns_proto::error::ProtoError;

/// Error enumerates the ways a Columbus exploration can fail.
///
/// Only some of these end a request. Failures of individual enrichment steps (S3 lookups,
/// Route53, origin fetches) are logged and leave the corresponding result field at its zero
/// value instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when neither the `requestUrl` query parameter nor
    /// [`Config::default_request_url`][`crate::config::Config::default_request_url`] (the
    /// `COLUMBUS_REQUEST_URL` environment variable) provides a URL to explore.
    #[error("no request URL given")]
    NoRequestUrl,

    /// Returned when the request URL can't be parsed, or has no host.
    #[error("invalid request URL \"{0}\"")]
    InvalidUrl(String),

    /// Returned when the configured DNS server has no A record answer for the target domain.
    #[error("failed to resolve target IP address for \"{0}\"")]
    UnresolvedTarget(String),

    /// Returned when the AWS IP ranges JSON isn't cached and can't be downloaded.
    #[error("failed to download AWS IP ranges from {url}")]
    IpRangesDownload {
        url: String,
        #[source]
        source: Box<Error>,
    },

    /// Returned when no CloudFront distribution has an origin matching the target domain.
    #[error("no CloudFront distribution found for \"{0}\"")]
    NoDistribution(String),

    /// Returned when an AWS API call that the exploration can't do without fails.
    #[error("AWS {operation} failed: {message}")]
    Aws {
        operation: &'static str,
        message: String,
    },

    /// Returned at startup when the AWS credentials chain yields no credentials.
    #[error("no AWS credentials: {0}")]
    NoCredentials(String),

    /// Returned when an HTTP request fails.
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// Returned when a DNS name can't be built from the target domain.
    #[error("DNS error")]
    DNSError(#[from] ProtoError),

    /// Returned when the DNS client fails to exchange a query with the configured server.
    #[error("DNS client error")]
    DNSClientError(#[from] ClientError),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON from disk (e.g.
    /// [trying to load a `Config`][crate::config::Config::try_from_file], or parsing the
    /// cached [AWS IP ranges][crate::ip_ranges::IpRangeTable]) fails due to invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn aws(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Error::Aws {
            operation,
            message: err.to_string(),
        }
    }
}
