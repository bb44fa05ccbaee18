use crate::error::Error;
use crate::inventory::{Distribution, DistributionPage, HostedZone, Inventory};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An S3 bucket held by a [`MemoryInventory`].
#[derive(Debug, Clone, Default)]
pub struct MemoryBucket {
    pub policy: Option<String>,
    /// `None` makes `GetBucketPolicyStatus` fail, as it does for buckets without a policy.
    pub policy_is_public: Option<bool>,
    pub website_index: Option<String>,
    /// Object key to (quoted) ETag.
    pub objects: HashMap<String, String>,
}

/// A fixed set of AWS resources. Every lookup of something that isn't there fails the way
/// the AWS API would.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct MemoryInventory {
    pub distributions: Vec<Distribution>,
    pub buckets: HashMap<String, MemoryBucket>,
    pub hosted_zones: Vec<HostedZone>,
    /// Hosted zone id to record set names.
    pub record_sets: HashMap<String, Vec<String>>,
    list_calls: AtomicUsize,
}

impl MemoryInventory {
    #[must_use]
    pub fn with_distributions(mut self, distributions: Vec<Distribution>) -> Self {
        self.distributions = distributions;
        self
    }

    #[must_use]
    pub fn with_bucket(mut self, name: &str, bucket: MemoryBucket) -> Self {
        self.buckets.insert(name.to_string(), bucket);
        self
    }

    #[must_use]
    pub fn with_hosted_zone(mut self, zone: HostedZone, record_names: &[&str]) -> Self {
        self.record_sets.insert(
            zone.id.clone(),
            record_names.iter().map(ToString::to_string).collect(),
        );
        self.hosted_zones.push(zone);
        self
    }

    /// Number of `ListDistributions` pages served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn bucket(&self, operation: &'static str, bucket: &str) -> Result<&MemoryBucket, Error> {
        self.buckets
            .get(bucket)
            .ok_or_else(|| Error::aws(operation, format!("NoSuchBucket: {bucket}")))
    }
}

#[async_trait::async_trait]
impl Inventory for MemoryInventory {
    async fn list_distributions(
        &self,
        marker: Option<&str>,
        max_items: i32,
    ) -> Result<DistributionPage, Error> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let start = match marker {
            None => 0,
            Some(marker) => marker.parse::<usize>().map_err(|_| {
                Error::aws("ListDistributions", format!("InvalidArgument: {marker}"))
            })?,
        };
        let page_size = usize::try_from(max_items).unwrap_or(0).max(1);
        let end = (start + page_size).min(self.distributions.len());
        let distributions = self.distributions.get(start..end).unwrap_or_default().to_vec();
        Ok(DistributionPage {
            distributions,
            next_marker: (end < self.distributions.len()).then(|| end.to_string()),
        })
    }

    async fn head_bucket(&self, bucket: &str) -> Result<(), Error> {
        self.bucket("HeadBucket", bucket).map(|_| ())
    }

    async fn bucket_policy(&self, bucket: &str) -> Result<Option<String>, Error> {
        Ok(self.bucket("GetBucketPolicy", bucket)?.policy.clone())
    }

    async fn bucket_policy_is_public(&self, bucket: &str) -> Result<bool, Error> {
        self.bucket("GetBucketPolicyStatus", bucket)?
            .policy_is_public
            .ok_or_else(|| Error::aws("GetBucketPolicyStatus", "NoSuchBucketPolicy"))
    }

    async fn bucket_website_index(&self, bucket: &str) -> Result<Option<String>, Error> {
        Ok(self
            .bucket("GetBucketWebsite", bucket)?
            .website_index
            .clone())
    }

    async fn object_etag(&self, bucket: &str, key: &str) -> Result<Option<String>, Error> {
        self.bucket("HeadObject", bucket)?
            .objects
            .get(key)
            .map(|etag| Some(etag.clone()))
            .ok_or_else(|| Error::aws("HeadObject", format!("NotFound: {key}")))
    }

    async fn hosted_zones_by_name(&self, dns_name: &str) -> Result<Vec<HostedZone>, Error> {
        // Route53 lists zones in name order starting at the requested name.
        let wanted = format!("{}.", dns_name.trim_end_matches('.'));
        let mut zones: Vec<HostedZone> = self
            .hosted_zones
            .iter()
            .filter(|zone| zone.name >= wanted)
            .cloned()
            .collect();
        zones.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(zones)
    }

    async fn record_set_names(&self, hosted_zone_id: &str) -> Result<Vec<String>, Error> {
        self.record_sets.get(hosted_zone_id).cloned().ok_or_else(|| {
            Error::aws(
                "ListResourceRecordSets",
                format!("NoSuchHostedZone: {hosted_zone_id}"),
            )
        })
    }
}
