//! The AWS resources Columbus inspects: CloudFront distributions, S3 buckets and Route53
//! hosted zones.
//!
//! The [`Inventory`] trait narrows the AWS APIs down to the calls Columbus makes. Two
//! implementations are provided, [`sdk::SdkInventory`] backed by the AWS SDK, and
//! [`memory::MemoryInventory`] holding a fixed set of resources, used in tests.

use crate::error::Error;
use std::sync::Arc;

pub mod memory;
pub mod sdk;

#[allow(clippy::module_name_repetitions)]
pub use memory::MemoryInventory;
#[allow(clippy::module_name_repetitions)]
pub use sdk::SdkInventory;

/// Summary of a CloudFront distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution {
    pub id: String,
    pub domain_name: String,
    pub status: String,
    /// Empty when no web ACL is associated.
    pub web_acl_id: String,
    pub origins: Vec<DistributionOrigin>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionOrigin {
    pub domain_name: String,
    pub origin_path: String,
    /// The origin has an S3 origin config.
    pub s3_origin: bool,
    /// The origin has a custom origin config.
    pub custom_origin: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionPage {
    pub distributions: Vec<Distribution>,
    /// Marker of the next page, `None` once the listing is exhausted.
    pub next_marker: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostedZone {
    pub id: String,
    /// Fully qualified, e.g. `sokker.info.`
    pub name: String,
}

#[allow(clippy::module_name_repetitions)]
pub type DynInventory = Arc<dyn Inventory + Send + Sync>;

/// An async trait over the CloudFront, S3 and Route53 calls Columbus makes.
#[async_trait::async_trait]
pub trait Inventory {
    /// One page of CloudFront `ListDistributions`, starting at `marker`.
    async fn list_distributions(
        &self,
        marker: Option<&str>,
        max_items: i32,
    ) -> Result<DistributionPage, Error>;

    /// S3 `HeadBucket`. Any error, including "not found", means the bucket can't be inspected.
    async fn head_bucket(&self, bucket: &str) -> Result<(), Error>;

    /// S3 `GetBucketPolicy`, the raw policy JSON if one is attached.
    async fn bucket_policy(&self, bucket: &str) -> Result<Option<String>, Error>;

    /// S3 `GetBucketPolicyStatus`.
    async fn bucket_policy_is_public(&self, bucket: &str) -> Result<bool, Error>;

    /// S3 `GetBucketWebsite`, the index document suffix if one is set.
    async fn bucket_website_index(&self, bucket: &str) -> Result<Option<String>, Error>;

    /// S3 `HeadObject`, the object's ETag as returned (quoted).
    async fn object_etag(&self, bucket: &str, key: &str) -> Result<Option<String>, Error>;

    /// Route53 `ListHostedZonesByName` starting at `dns_name`.
    async fn hosted_zones_by_name(&self, dns_name: &str) -> Result<Vec<HostedZone>, Error>;

    /// Names of the record sets in a hosted zone (Route53 `ListResourceRecordSets`).
    async fn record_set_names(&self, hosted_zone_id: &str) -> Result<Vec<String>, Error>;
}
