//! Filling in what can be learned about a distribution's origins.
//!
//! Every step here is best effort. A failing lookup is logged and leaves its field at the
//! zero value; it never fails the exploration.

use crate::inventory::Inventory;
use crate::mapping::{BucketPolicy, CloudFrontOrigin};
use crate::traffic::{clean_etag, Traffic, UrlResponse};

/// Inspect the bucket behind an S3 origin (API Gateway origins are left alone), then fetch
/// the origin's public URL.
pub async fn enrich(
    inventory: &(dyn Inventory + Send + Sync),
    traffic: &(dyn Traffic + Send + Sync),
    mut origin: CloudFrontOrigin,
    index_file_path: &str,
) -> CloudFrontOrigin {
    tracing::info!(
        "origin {} \"{}\" at {}",
        origin.origin_type,
        origin.origin_name,
        origin.origin_url
    );
    if origin.origin_type.is_s3() {
        inspect_bucket(inventory, &mut origin, index_file_path).await;
    }
    origin.url_response = fetch(traffic, &origin.public_url()).await;
    origin
}

/// Inspect the origin's bucket. A bucket that can't be `HEAD`ed is left with
/// `resource_exists == false` and nothing else is looked up.
pub async fn inspect_bucket(
    inventory: &(dyn Inventory + Send + Sync),
    origin: &mut CloudFrontOrigin,
    index_file_path: &str,
) {
    let bucket = origin.origin_name.as_str();
    if let Err(err) = inventory.head_bucket(bucket).await {
        tracing::warn!("bucket {bucket} can't be inspected: {err}");
        return;
    }
    origin.resource_exists = true;

    origin.bucket_policy = match inventory.bucket_policy(bucket).await {
        Ok(Some(raw)) => BucketPolicy::parse(&raw),
        Ok(None) => BucketPolicy::Absent,
        Err(err) => {
            tracing::warn!("no policy for bucket {bucket}: {err}");
            BucketPolicy::Absent
        }
    };

    origin.bucket_policy_is_public = inventory
        .bucket_policy_is_public(bucket)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!("no policy status for bucket {bucket}: {err}");
            false
        });

    // Lookup errors and buckets without website hosting both end up as `false`.
    origin.is_website = match inventory.bucket_website_index(bucket).await {
        Ok(index) => index.is_some(),
        Err(err) => {
            tracing::debug!("no website configuration for bucket {bucket}: {err}");
            false
        }
    };

    origin.index_etag = match inventory.object_etag(bucket, index_file_path).await {
        Ok(etag) => etag.as_deref().map(clean_etag).unwrap_or_default(),
        Err(err) => {
            tracing::warn!("no ETag for s3://{bucket}/{index_file_path}: {err}");
            String::new()
        }
    };

    tracing::debug!(
        "bucket {bucket}: website={} public={} etag={}",
        origin.is_website,
        origin.bucket_policy_is_public,
        origin.index_etag
    );
}

/// `GET` a URL, falling back to an empty [`UrlResponse`] on failure.
pub(crate) async fn fetch(traffic: &(dyn Traffic + Send + Sync), url: &str) -> UrlResponse {
    match traffic.get(url).await {
        Ok(response) => {
            tracing::debug!("{url} answered {}", response.status_code);
            response
        }
        Err(err) => {
            tracing::warn!("failed to fetch {url}: {err}");
            UrlResponse::default()
        }
    }
}
