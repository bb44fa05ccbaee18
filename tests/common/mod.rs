#![allow(dead_code)]

use async_trait::async_trait;
use columbus::dns::Resolver;
use columbus::error::Error;
use columbus::inventory::memory::MemoryBucket;
use columbus::inventory::{Distribution, DistributionOrigin, HostedZone, MemoryInventory};
use columbus::traffic::{HttpHeader, Traffic, UrlResponse};
use columbus::{Config, Explorer};
use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const IP_RANGES_URL: &str = "https://ip-ranges.example/ip-ranges.json";

pub const IP_RANGES: &str = r#"{
  "syncToken": "1640995200",
  "createDate": "2022-01-01-00-00-00",
  "prefixes": [
    {"ip_prefix": "13.32.0.0/15", "region": "GLOBAL", "service": "AMAZON", "network_border_group": "GLOBAL"},
    {"ip_prefix": "13.32.0.0/15", "region": "GLOBAL", "service": "CLOUDFRONT", "network_border_group": "GLOBAL"},
    {"ip_prefix": "52.218.0.0/17", "region": "eu-west-1", "service": "AMAZON", "network_border_group": "eu-west-1"},
    {"ip_prefix": "52.218.0.0/17", "region": "eu-west-1", "service": "S3", "network_border_group": "eu-west-1"},
    {"ip_prefix": "52.218.0.0/17", "region": "eu-west-1", "service": "EC2", "network_border_group": "eu-west-1"}
  ]
}"#;

/// Answers from a fixed table of domain names.
#[derive(Default)]
pub struct StaticResolver {
    pub answers: HashMap<String, Ipv4Addr>,
    pub lookup_fails: bool,
    /// Held before every `A` query answer.
    pub delay: Duration,
}

impl StaticResolver {
    pub fn with(mut self, domain: &str, ip: [u8; 4]) -> Self {
        self.answers.insert(domain.to_string(), Ipv4Addr::from(ip));
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn resolve_a(&self, domain_name: &str) -> Result<Option<Ipv4Addr>, Error> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.answers.get(domain_name).copied())
    }

    async fn lookup_a(&self, domain_name: &str) -> Result<Vec<IpAddr>, Error> {
        if self.lookup_fails {
            return Err(Error::IO(io::Error::new(io::ErrorKind::Other, "no resolver")));
        }
        Ok(self
            .answers
            .get(domain_name)
            .map(|ip| vec![IpAddr::V4(*ip)])
            .unwrap_or_default())
    }
}

/// Serves canned responses by URL and the IP ranges document, counting its downloads.
#[derive(Default)]
pub struct FakeTraffic {
    pub responses: HashMap<String, UrlResponse>,
    ip_ranges_unavailable: bool,
    downloads: AtomicUsize,
}

impl FakeTraffic {
    pub fn with_response(mut self, url: &str, status_code: u16, headers: &[(&str, &str)]) -> Self {
        self.responses.insert(
            url.to_string(),
            UrlResponse {
                status_code,
                headers: headers
                    .iter()
                    .map(|(name, value)| HttpHeader {
                        name: (*name).to_string(),
                        value: (*value).to_string(),
                    })
                    .collect(),
            },
        );
        self
    }

    /// Fail every download of the IP ranges document.
    pub fn without_ip_ranges(mut self) -> Self {
        self.ip_ranges_unavailable = true;
        self
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Traffic for FakeTraffic {
    async fn get(&self, url: &str) -> Result<UrlResponse, Error> {
        self.responses.get(url).cloned().ok_or_else(|| {
            Error::IO(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("nothing at {url}"),
            ))
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, Error> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if self.ip_ranges_unavailable || url != IP_RANGES_URL {
            return Err(Error::IO(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("can't download {url}"),
            )));
        }
        Ok(IP_RANGES.as_bytes().to_vec())
    }
}

pub fn s3_origin(domain: &str) -> DistributionOrigin {
    DistributionOrigin {
        domain_name: domain.to_string(),
        origin_path: String::new(),
        s3_origin: true,
        custom_origin: false,
    }
}

pub fn api_gateway_origin(domain: &str, path: &str) -> DistributionOrigin {
    DistributionOrigin {
        domain_name: domain.to_string(),
        origin_path: path.to_string(),
        s3_origin: false,
        custom_origin: true,
    }
}

pub fn distribution(id: &str, web_acl_id: &str, origins: Vec<DistributionOrigin>) -> Distribution {
    Distribution {
        id: id.to_string(),
        domain_name: format!("{}.cloudfront.net", id.to_lowercase()),
        status: "Deployed".to_string(),
        web_acl_id: web_acl_id.to_string(),
        origins,
    }
}

pub fn website_bucket() -> MemoryBucket {
    MemoryBucket {
        policy: Some(
            r#"{"Version": "2012-10-17", "Statement": [{"Sid": "PublicRead", "Effect": "Allow",
                "Principal": "*", "Action": "s3:GetObject",
                "Resource": "arn:aws:s3:::dev.sokker.info/*"}]}"#
                .to_string(),
        ),
        policy_is_public: Some(true),
        website_index: Some("index.html".to_string()),
        objects: HashMap::from([(
            "index.html".to_string(),
            "\"9b2cf535f27731c974343645a3985328\"".to_string(),
        )]),
    }
}

/// The `dev.sokker.info` site: a CloudFront distribution in front of a same-named bucket,
/// with a Route53 zone for `sokker.info`.
pub fn sokker_inventory() -> MemoryInventory {
    MemoryInventory::default()
        .with_distributions(vec![
            distribution("E0OTHER", "", vec![s3_origin("other.s3.eu-west-1.amazonaws.com")]),
            distribution(
                "E1SOKKER",
                "arn:aws:wafv2:us-east-1:123456789012:global/webacl/sokker/1",
                vec![s3_origin("dev.sokker.info.s3.eu-west-1.amazonaws.com")],
            ),
        ])
        .with_bucket("dev.sokker.info", website_bucket())
        .with_hosted_zone(
            HostedZone {
                id: "/hostedzone/Z1SOKKER".to_string(),
                name: "sokker.info.".to_string(),
            },
            &["sokker.info.", "dev.sokker.info."],
        )
}

pub fn sokker_resolver() -> StaticResolver {
    StaticResolver::default()
        .with("dev.sokker.info", [13, 32, 1, 2])
        .with("s3.eu-west-1.amazonaws.com", [52, 218, 1, 2])
}

pub fn sokker_traffic() -> FakeTraffic {
    FakeTraffic::default()
        .with_response(
            "https://dev.sokker.info",
            200,
            &[("server", "AmazonS3"), ("etag", "\"9b2cf535f27731c974343645a3985328\"")],
        )
        .with_response(
            "http://dev.sokker.info.s3.eu-west-1.amazonaws.com",
            403,
            &[("server", "AmazonS3")],
        )
}

/// A config caching the IP ranges in a fresh temporary directory, which must outlive the
/// explorer.
pub fn test_config() -> (Config, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        ip_ranges_url: IP_RANGES_URL.to_string(),
        ip_ranges_cache_path: dir.path().join(".ip-ranges.json"),
        ..Config::default()
    };
    (config, dir)
}

pub fn explorer(
    config: Config,
    resolver: StaticResolver,
    traffic: Arc<FakeTraffic>,
    inventory: MemoryInventory,
) -> Explorer {
    Explorer::new(
        Arc::new(config),
        Arc::new(resolver),
        traffic,
        Arc::new(inventory),
    )
}
