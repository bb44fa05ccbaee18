//! The result of one exploration, serialized as the `/explore` response body.
//!
//! ```json
//! {
//!   "cloudFrontOrigins": [
//!     {
//!       "originType": "s3-bucket",
//!       "originName": "dev.sokker.info",
//!       "originUrl": "dev.sokker.info.s3.eu-west-1.amazonaws.com",
//!       "originPath": "",
//!       "indexETag": "d41d8cd98f00b204e9800998ecf8427e",
//!       "bucketPolicy": { "state": "document", "document": { "Version": "2012-10-17", ... } },
//!       "bucketPolicyIsPublic": false,
//!       "resourceExists": true,
//!       "isWebsite": false,
//!       "urlResponse": { "statusCode": 403, "headers": [ ... ] }
//!     }
//!   ],
//!   "targetDomain": {
//!     "domainName": "dev.sokker.info",
//!     "registeredDomainName": "sokker.info",
//!     "targetIpAddress": "13.32.1.2",
//!     "targetService": "CLOUDFRONT",
//!     ...
//!   }
//! }
//! ```

use crate::traffic::UrlResponse;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, OneOrMany};
use std::collections::BTreeMap;
use std::fmt;

/// Written wherever a lookup found nothing to report (no WAF, no Route53 record).
pub const NONE: &str = "none";

/// Aggregate result of one exploration. Every request builds its own.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AwsMapping {
    pub cloud_front_origins: Vec<CloudFrontOrigin>,
    pub target_domain: TargetDomain,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TargetDomain {
    pub domain_name: String,
    pub registered_domain_name: String,
    pub target_ip_address: String,
    /// Service owning the target address per the AWS IP ranges; empty when no range matched.
    pub target_service: String,
    pub url_response: UrlResponse,
    /// ETag of the target URL, only captured when it's served by S3.
    pub etag_response: String,
    pub route53_record: String,
    pub waf_id: String,
    pub ns_lookup: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginType {
    /// A CloudFront origin with an S3 origin config, i.e. the bucket's REST endpoint.
    #[serde(rename = "s3-bucket")]
    S3Bucket,
    /// A custom origin pointing at a bucket's static website endpoint.
    #[serde(rename = "s3-website")]
    S3Website,
    /// A custom origin pointing at an API Gateway `execute-api` endpoint.
    #[serde(rename = "apigw")]
    ApiGateway,
}

impl OriginType {
    #[must_use]
    pub fn is_s3(self) -> bool {
        matches!(self, OriginType::S3Bucket | OriginType::S3Website)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OriginType::S3Bucket => "s3-bucket",
            OriginType::S3Website => "s3-website",
            OriginType::ApiGateway => "apigw",
        }
    }
}

impl fmt::Display for OriginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloudFrontOrigin {
    pub origin_type: OriginType,
    /// Bucket name for S3 origins, API id for API Gateway origins.
    pub origin_name: String,
    /// The origin's domain name as configured in the distribution.
    pub origin_url: String,
    pub origin_path: String,
    #[serde(rename = "indexETag")]
    pub index_etag: String,
    pub bucket_policy: BucketPolicy,
    pub bucket_policy_is_public: bool,
    pub resource_exists: bool,
    pub is_website: bool,
    pub url_response: UrlResponse,
}

impl CloudFrontOrigin {
    #[must_use]
    pub fn new(origin_type: OriginType, origin_name: &str, origin_url: &str, origin_path: &str) -> Self {
        Self {
            origin_type,
            origin_name: origin_name.to_string(),
            origin_url: origin_url.to_string(),
            origin_path: origin_path.to_string(),
            index_etag: String::new(),
            bucket_policy: BucketPolicy::Absent,
            bucket_policy_is_public: false,
            resource_exists: false,
            is_website: false,
            url_response: UrlResponse::default(),
        }
    }

    /// The URL the origin answers on outside of CloudFront.
    #[must_use]
    pub fn public_url(&self) -> String {
        match self.origin_type {
            OriginType::S3Bucket | OriginType::S3Website => format!("http://{}", self.origin_url),
            OriginType::ApiGateway => format!(
                "https://{}/{}",
                self.origin_url,
                self.origin_path.trim_start_matches('/')
            ),
        }
    }
}

/// The policy attached to an S3 origin's bucket.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum BucketPolicy {
    /// No policy is attached, or it couldn't be fetched.
    #[default]
    Absent,
    /// A policy was fetched but isn't a document Columbus understands.
    Unknown { raw: String },
    Document { document: PolicyDocument },
}

impl BucketPolicy {
    /// Parse a policy as returned by S3. Text that doesn't parse is kept as
    /// [`BucketPolicy::Unknown`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(document) => BucketPolicy::Document { document },
            Err(err) => {
                tracing::warn!("failed to parse bucket policy: {err}");
                BucketPolicy::Unknown {
                    raw: raw.to_string(),
                }
            }
        }
    }
}

/// An IAM policy document, keeping IAM's own key names.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub statement: Vec<Statement>,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: String,
    #[serde_as(as = "OneOrMany<_>")]
    #[serde(default)]
    pub action: Vec<String>,
    #[serde_as(as = "OneOrMany<_>")]
    #[serde(default)]
    pub resource: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Principal {
    /// `"Principal": "*"`
    Any(String),
    /// `"Principal": {"AWS": [...], "Service": "cloudfront.amazonaws.com"}`
    Typed(#[serde_as(as = "BTreeMap<_, OneOrMany<_>>")] BTreeMap<String, Vec<String>>),
}

impl Principal {
    #[must_use]
    pub fn is_anyone(&self) -> bool {
        match self {
            Principal::Any(p) => p == "*",
            Principal::Typed(kinds) => kinds
                .get("AWS")
                .is_some_and(|ids| ids.iter().any(|id| id == "*")),
        }
    }
}
