//! [`Inventory`][super::Inventory] backed by the AWS SDK clients.
use crate::error::Error;
use crate::inventory::{Distribution, DistributionOrigin, DistributionPage, HostedZone, Inventory};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_route53::operation::list_resource_record_sets::ListResourceRecordSetsOutput;
use aws_sdk_route53::types::RrType;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};

/// Talks to CloudFront, S3 and Route53 with the credentials and region of one [`SdkConfig`].
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct SdkInventory {
    cloudfront: aws_sdk_cloudfront::Client,
    s3: aws_sdk_s3::Client,
    route53: aws_sdk_route53::Client,
}

impl SdkInventory {
    #[must_use]
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            cloudfront: aws_sdk_cloudfront::Client::new(config),
            s3: aws_sdk_s3::Client::new(config),
            route53: aws_sdk_route53::Client::new(config),
        }
    }
}

/// Load the AWS configuration for `region` from the SDK's default sources.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// Resolve the configured credentials once.
///
/// The default chain is installed even when none of its sources has credentials, so only
/// resolving it tells whether AWS can be called at all.
///
/// # Errors
///
/// Returns [`Error::NoCredentials`] if there's no credentials provider or it fails.
pub async fn verify_credentials(config: &SdkConfig) -> Result<(), Error> {
    let Some(provider) = config.credentials_provider() else {
        return Err(Error::NoCredentials("no credentials provider".to_string()));
    };
    provider
        .provide_credentials()
        .await
        .map_err(|err| Error::NoCredentials(DisplayErrorContext(&err).to_string()))?;
    Ok(())
}

fn distribution(summary: &aws_sdk_cloudfront::types::DistributionSummary) -> Distribution {
    let origins = summary
        .origins()
        .map(|origins| {
            origins
                .items()
                .iter()
                .map(|origin| DistributionOrigin {
                    domain_name: origin.domain_name().to_string(),
                    origin_path: origin.origin_path().unwrap_or_default().to_string(),
                    s3_origin: origin.s3_origin_config().is_some(),
                    custom_origin: origin.custom_origin_config().is_some(),
                })
                .collect()
        })
        .unwrap_or_default();
    Distribution {
        id: summary.id().to_string(),
        domain_name: summary.domain_name().to_string(),
        status: summary.status().to_string(),
        web_acl_id: summary.web_acl_id().to_string(),
        origins,
    }
}

#[async_trait::async_trait]
impl Inventory for SdkInventory {
    async fn list_distributions(
        &self,
        marker: Option<&str>,
        max_items: i32,
    ) -> Result<DistributionPage, Error> {
        let output = self
            .cloudfront
            .list_distributions()
            .set_marker(marker.map(ToString::to_string))
            .max_items(max_items)
            .send()
            .await
            .map_err(|err| Error::aws("ListDistributions", DisplayErrorContext(&err)))?;

        let Some(list) = output.distribution_list() else {
            return Ok(DistributionPage::default());
        };
        Ok(DistributionPage {
            distributions: list.items().iter().map(distribution).collect(),
            next_marker: if list.is_truncated() {
                list.next_marker().map(ToString::to_string)
            } else {
                None
            },
        })
    }

    async fn head_bucket(&self, bucket: &str) -> Result<(), Error> {
        self.s3
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| Error::aws("HeadBucket", DisplayErrorContext(&err)))?;
        Ok(())
    }

    async fn bucket_policy(&self, bucket: &str) -> Result<Option<String>, Error> {
        match self.s3.get_bucket_policy().bucket(bucket).send().await {
            Ok(output) => Ok(output.policy().map(ToString::to_string)),
            Err(err) if err.code() == Some("NoSuchBucketPolicy") => Ok(None),
            Err(err) => Err(Error::aws("GetBucketPolicy", DisplayErrorContext(&err))),
        }
    }

    async fn bucket_policy_is_public(&self, bucket: &str) -> Result<bool, Error> {
        let output = self
            .s3
            .get_bucket_policy_status()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| Error::aws("GetBucketPolicyStatus", DisplayErrorContext(&err)))?;
        Ok(output
            .policy_status()
            .and_then(|status| status.is_public())
            .unwrap_or(false))
    }

    async fn bucket_website_index(&self, bucket: &str) -> Result<Option<String>, Error> {
        match self.s3.get_bucket_website().bucket(bucket).send().await {
            Ok(output) => Ok(output
                .index_document()
                .map(|index| index.suffix().to_string())),
            Err(err) if err.code() == Some("NoSuchWebsiteConfiguration") => Ok(None),
            Err(err) => Err(Error::aws("GetBucketWebsite", DisplayErrorContext(&err))),
        }
    }

    async fn object_etag(&self, bucket: &str, key: &str) -> Result<Option<String>, Error> {
        let output = self
            .s3
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| Error::aws("HeadObject", DisplayErrorContext(&err)))?;
        Ok(output.e_tag().map(ToString::to_string))
    }

    async fn hosted_zones_by_name(&self, dns_name: &str) -> Result<Vec<HostedZone>, Error> {
        let output = self
            .route53
            .list_hosted_zones_by_name()
            .dns_name(dns_name)
            .send()
            .await
            .map_err(|err| Error::aws("ListHostedZonesByName", DisplayErrorContext(&err)))?;
        Ok(output
            .hosted_zones()
            .iter()
            .map(|zone| HostedZone {
                id: zone.id().to_string(),
                name: zone.name().to_string(),
            })
            .collect())
    }

    async fn record_set_names(&self, hosted_zone_id: &str) -> Result<Vec<String>, Error> {
        let mut names = Vec::new();
        let mut start: Option<RecordSetStart> = None;
        loop {
            let mut request = self
                .route53
                .list_resource_record_sets()
                .hosted_zone_id(hosted_zone_id);
            if let Some(start) = start.take() {
                request = request
                    .start_record_name(start.name)
                    .set_start_record_type(start.record_type)
                    .set_start_record_identifier(start.identifier);
            }
            let output = request
                .send()
                .await
                .map_err(|err| Error::aws("ListResourceRecordSets", DisplayErrorContext(&err)))?;
            names.extend(
                output
                    .resource_record_sets()
                    .iter()
                    .map(|record| record.name().to_string()),
            );
            match next_record_set_start(&output) {
                Some(next) => start = Some(next),
                None => break,
            }
        }
        tracing::debug!("{} record sets in hosted zone {hosted_zone_id}", names.len());
        Ok(names)
    }
}

/// Where the next `ListResourceRecordSets` page starts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RecordSetStart {
    name: String,
    record_type: Option<RrType>,
    identifier: Option<String>,
}

fn next_record_set_start(output: &ListResourceRecordSetsOutput) -> Option<RecordSetStart> {
    if !output.is_truncated() {
        return None;
    }
    output.next_record_name().map(|name| RecordSetStart {
        name: name.to_string(),
        record_type: output.next_record_type().cloned(),
        identifier: output.next_record_identifier().map(ToString::to_string),
    })
}
