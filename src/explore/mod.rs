//! The exploration pipeline.
//!
//! Starting from a URL, an [`Explorer`] works out where it lives in AWS, one step after the
//! other:
//!
//! 1. the domain name and registered domain of the URL,
//! 2. the target IP address, from an `A` query against the configured DNS server,
//! 3. the AWS service owning that address, from the [AWS IP ranges][crate::ip_ranges],
//! 4. the URL's own response (and its ETag when S3 serves it),
//! 5. the CloudFront distribution fronting the domain ([`matcher`]),
//! 6. what can be learned about each of the distribution's origins ([`enricher`]),
//! 7. the domain's Route53 record ([`route53`]),
//! 8. nslookup-style A records of the domain.
//!
//! Steps 1 to 4 are available on their own through [`Explorer::resolve_target`]. Failures in
//! steps 1, 2, 3 and 5 end the exploration with an [`Error`]; everything else degrades to
//! empty values.

use crate::config::SharedConfig;
use crate::dns::{self, DynResolver};
use crate::error::Error;
use crate::inventory::DynInventory;
use crate::ip_ranges::IpRangesCache;
use crate::mapping::{AwsMapping, TargetDomain, NONE};
use crate::traffic::{clean_etag, DynTraffic};
use std::net::IpAddr;
use std::sync::Arc;

pub mod enricher;
pub mod matcher;
pub mod route53;

/// `Server` header value of responses served by S3.
const S3_SERVER: &str = "AmazonS3";

pub type SharedExplorer = Arc<Explorer>;

/// Runs explorations. Holds nothing specific to one request, so a single `Explorer` is shared
/// by every request the API serves.
pub struct Explorer {
    config: SharedConfig,
    resolver: DynResolver,
    traffic: DynTraffic,
    inventory: DynInventory,
    ip_ranges: IpRangesCache,
}

impl Explorer {
    #[must_use]
    pub fn new(
        config: SharedConfig,
        resolver: DynResolver,
        traffic: DynTraffic,
        inventory: DynInventory,
    ) -> Self {
        let ip_ranges = IpRangesCache::new(
            config.ip_ranges_cache_path.clone(),
            config.ip_ranges_url.clone(),
            config.ip_ranges_max_age,
        );
        Self {
            config,
            resolver,
            traffic,
            inventory,
            ip_ranges,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// The URL to explore: the given one, else the configured default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRequestUrl`] if neither is set (or both are empty).
    pub fn request_url(&self, requested: Option<&str>) -> Result<String, Error> {
        requested
            .filter(|url| !url.is_empty())
            .or(self.config.default_request_url.as_deref())
            .filter(|url| !url.is_empty())
            .map(ToString::to_string)
            .ok_or(Error::NoRequestUrl)
    }

    /// Resolve and classify the target of `request_url` and fetch it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `request_url` has no host.
    ///
    /// Returns [`Error::UnresolvedTarget`] if the DNS server has no `A` record for the domain,
    /// or [`Error::DNSError`]/[`Error::DNSClientError`] if it can't be asked.
    ///
    /// Returns [`Error::IpRangesDownload`] if the AWS IP ranges aren't cached and can't be
    /// downloaded.
    pub async fn resolve_target(&self, request_url: &str) -> Result<TargetDomain, Error> {
        tracing::info!("exploring {request_url}");
        let domain_name = dns::domain_name(request_url);
        let registered_domain_name = dns::registered_domain(request_url)?;
        tracing::info!("domain name: {domain_name}");
        tracing::info!("registered domain name: {registered_domain_name}");

        let target_ip = self
            .resolver
            .resolve_a(&domain_name)
            .await?
            .ok_or_else(|| Error::UnresolvedTarget(domain_name.clone()))?;
        tracing::info!("target IP address: {target_ip}");

        let table = self.ip_ranges.load(self.traffic.as_ref()).await?;
        let target_service = table
            .classify(IpAddr::V4(target_ip))
            .unwrap_or_default()
            .to_string();
        if target_service.is_empty() {
            // Most often EC2 (API Gateway included), which the ranges can't tell apart.
            tracing::info!("target service: unknown");
        } else {
            tracing::info!("target service: {target_service}");
        }

        let url_response = enricher::fetch(self.traffic.as_ref(), request_url).await;
        let etag_response = if url_response.header("server") == Some(S3_SERVER) {
            url_response
                .header("etag")
                .map(clean_etag)
                .unwrap_or_default()
        } else {
            String::new()
        };

        Ok(TargetDomain {
            domain_name,
            registered_domain_name,
            target_ip_address: target_ip.to_string(),
            target_service,
            url_response,
            etag_response,
            ..TargetDomain::default()
        })
    }

    /// Run the whole exploration of `requested`, or of the configured default URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRequestUrl`] if there's no URL to explore.
    ///
    /// Returns any error of [`Explorer::resolve_target`].
    ///
    /// Returns [`Error::Aws`] if the CloudFront distributions can't be listed, and
    /// [`Error::NoDistribution`] if none of them fronts the domain.
    pub async fn explore(&self, requested: Option<&str>) -> Result<AwsMapping, Error> {
        let request_url = self.request_url(requested)?;
        let mut target_domain = self.resolve_target(&request_url).await?;

        let matched = matcher::find_distribution(
            self.inventory.as_ref(),
            &target_domain.domain_name,
            &self.config.aws_region,
        )
        .await?
        .ok_or_else(|| Error::NoDistribution(target_domain.domain_name.clone()))?;

        target_domain.waf_id = if matched.distribution.web_acl_id.is_empty() {
            NONE.to_string()
        } else {
            matched.distribution.web_acl_id.clone()
        };
        tracing::info!("WAF: {}", target_domain.waf_id);

        let mut cloud_front_origins = Vec::with_capacity(matched.origins.len());
        for origin in matched.origins {
            cloud_front_origins.push(
                enricher::enrich(
                    self.inventory.as_ref(),
                    self.traffic.as_ref(),
                    origin,
                    &self.config.index_file_path,
                )
                .await,
            );
        }

        target_domain.route53_record = route53::find_record(
            self.inventory.as_ref(),
            &target_domain.registered_domain_name,
            &target_domain.domain_name,
        )
        .await;

        target_domain.ns_lookup = self.ns_lookup(&target_domain.domain_name).await;

        Ok(AwsMapping {
            cloud_front_origins,
            target_domain,
        })
    }

    async fn ns_lookup(&self, domain_name: &str) -> Vec<String> {
        match self.resolver.lookup_a(domain_name).await {
            Ok(ips) => ips
                .into_iter()
                .map(|ip| dns::nslookup_line(domain_name, ip))
                .collect(),
            Err(err) => {
                tracing::warn!("nslookup of {domain_name} failed: {err}");
                Vec::new()
            }
        }
    }
}
