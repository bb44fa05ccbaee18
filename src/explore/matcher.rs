//! Finding the CloudFront distribution that fronts a domain.
//!
//! A distribution is picked by its origins, in listing order. Each distribution's origins are
//! classified (see [`derive_origins`]) and checked against two [`MatchRule`]s:
//!
//! 1. [`MatchRule::OriginPrefix`]: the origin's domain starts with the explored domain, e.g.
//!    bucket `dev.sokker.info` served at `https://dev.sokker.info`.
//! 2. [`MatchRule::ApiGatewayOrigin`]: the origin is an API Gateway endpoint. Any such origin
//!    matches, whatever the domain. This is a heuristic and a known source of false positives;
//!    it only applies when no origin of the same distribution matches by prefix.
//!
//! The first distribution with a match wins.

use crate::error::Error;
use crate::inventory::{Distribution, DistributionOrigin, Inventory};
use crate::mapping::{CloudFrontOrigin, OriginType};

/// `ListDistributions` page size.
pub const PAGE_SIZE: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    OriginPrefix,
    ApiGatewayOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedDistribution {
    pub distribution: Distribution,
    pub origins: Vec<CloudFrontOrigin>,
    pub rule: MatchRule,
}

/// List every distribution, following the listing's markers until it's exhausted.
///
/// # Errors
///
/// Returns [`Error::Aws`] if any page can't be listed.
pub async fn list_distributions(
    inventory: &(dyn Inventory + Send + Sync),
) -> Result<Vec<Distribution>, Error> {
    let mut distributions = Vec::new();
    let mut marker: Option<String> = None;
    loop {
        let page = inventory
            .list_distributions(marker.as_deref(), PAGE_SIZE)
            .await?;
        distributions.extend(page.distributions);
        match page.next_marker {
            Some(next) => marker = Some(next),
            None => break,
        }
    }
    tracing::info!("found {} CloudFront distributions", distributions.len());
    Ok(distributions)
}

/// Classify a distribution's origins. Origins that are neither S3 nor API Gateway are dropped.
#[must_use]
pub fn derive_origins(distribution: &Distribution, region: &str) -> Vec<CloudFrontOrigin> {
    distribution
        .origins
        .iter()
        .filter_map(|origin| derive_origin(origin, region))
        .collect()
}

fn derive_origin(origin: &DistributionOrigin, region: &str) -> Option<CloudFrontOrigin> {
    let domain = origin.domain_name.as_str();
    let (origin_type, name) = if origin.s3_origin {
        (OriginType::S3Bucket, s3_bucket_name(domain, region))
    } else if origin.custom_origin && domain.contains("s3-website") {
        (OriginType::S3Website, prefix_before(domain, ".s3-website"))
    } else if domain.contains(".execute-api.") {
        (OriginType::ApiGateway, prefix_before(domain, ".execute-api."))
    } else {
        tracing::debug!("ignoring origin {domain}");
        return None;
    };
    tracing::debug!("origin {domain} is {origin_type} \"{name}\"");
    Some(CloudFrontOrigin::new(
        origin_type,
        name,
        domain,
        &origin.origin_path,
    ))
}

// Regional (`b.s3.eu-west-1.amazonaws.com`), global (`b.s3.amazonaws.com`) and legacy
// dash-regional (`b.s3-eu-west-1.amazonaws.com`) REST endpoints.
fn s3_bucket_name<'a>(domain: &'a str, region: &str) -> &'a str {
    domain
        .split_once(&format!(".s3.{region}."))
        .or_else(|| domain.split_once(".s3."))
        .or_else(|| domain.split_once(".s3-"))
        .map_or(domain, |(bucket, _)| bucket)
}

fn prefix_before<'a>(domain: &'a str, marker: &str) -> &'a str {
    domain.split_once(marker).map_or(domain, |(prefix, _)| prefix)
}

/// Which rule, if any, makes `origin` match `domain_name`.
#[must_use]
pub fn match_rule(origin: &CloudFrontOrigin, domain_name: &str) -> Option<MatchRule> {
    if origin.origin_url.starts_with(domain_name) {
        Some(MatchRule::OriginPrefix)
    } else if origin.origin_type == OriginType::ApiGateway {
        Some(MatchRule::ApiGatewayOrigin)
    } else {
        None
    }
}

fn best_rule(origins: &[CloudFrontOrigin], domain_name: &str) -> Option<(MatchRule, String)> {
    let rules = origins
        .iter()
        .filter_map(|origin| match_rule(origin, domain_name).map(|rule| (rule, origin)));
    let mut fallback = None;
    for (rule, origin) in rules {
        match rule {
            MatchRule::OriginPrefix => return Some((rule, origin.origin_name.clone())),
            MatchRule::ApiGatewayOrigin => {
                fallback = fallback.or_else(|| Some((rule, origin.origin_name.clone())));
            }
        }
    }
    fallback
}

/// Pick the first distribution in `distributions` with an origin matching `domain_name`.
#[must_use]
pub fn match_distribution(
    distributions: Vec<Distribution>,
    domain_name: &str,
    region: &str,
) -> Option<MatchedDistribution> {
    for distribution in distributions {
        let origins = derive_origins(&distribution, region);
        if let Some((rule, origin_name)) = best_rule(&origins, domain_name) {
            tracing::info!(
                "found CloudFront distribution {} ({}) by origin {origin_name} ({rule:?})",
                distribution.id,
                distribution.domain_name
            );
            return Some(MatchedDistribution {
                distribution,
                origins,
                rule,
            });
        }
    }
    None
}

/// List all distributions and pick the one fronting `domain_name`.
///
/// # Errors
///
/// Returns [`Error::Aws`] if the distributions can't be listed. Finding no match isn't an
/// error.
pub async fn find_distribution(
    inventory: &(dyn Inventory + Send + Sync),
    domain_name: &str,
    region: &str,
) -> Result<Option<MatchedDistribution>, Error> {
    let distributions = list_distributions(inventory).await?;
    Ok(match_distribution(distributions, domain_name, region))
}
