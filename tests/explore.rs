mod common;

use columbus::error::Error;
use columbus::inventory::MemoryInventory;
use columbus::mapping::{BucketPolicy, OriginType, NONE};
use common::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn explores_cloudfront_site_backed_by_bucket() {
    let (config, _dir) = test_config();
    let traffic = Arc::new(sokker_traffic());
    let explorer = explorer(config, sokker_resolver(), traffic.clone(), sokker_inventory());

    let mapping = explorer
        .explore(Some("https://dev.sokker.info"))
        .await
        .unwrap();

    let target = &mapping.target_domain;
    assert_eq!(target.domain_name, "dev.sokker.info");
    assert_eq!(target.registered_domain_name, "sokker.info");
    assert_eq!(target.target_ip_address, "13.32.1.2");
    assert_eq!(target.target_service, "CLOUDFRONT");
    assert_eq!(target.url_response.status_code, 200);
    assert_eq!(target.etag_response, "9b2cf535f27731c974343645a3985328");
    assert_eq!(
        target.waf_id,
        "arn:aws:wafv2:us-east-1:123456789012:global/webacl/sokker/1"
    );
    assert_eq!(target.route53_record, "dev.sokker.info.");
    assert_eq!(target.ns_lookup, vec!["dev.sokker.info. IN A 13.32.1.2\n"]);

    assert_eq!(mapping.cloud_front_origins.len(), 1);
    let origin = &mapping.cloud_front_origins[0];
    assert_eq!(origin.origin_type, OriginType::S3Bucket);
    assert_eq!(origin.origin_name, "dev.sokker.info");
    assert!(origin.resource_exists);
    assert!(origin.is_website);
    assert!(origin.bucket_policy_is_public);
    assert_eq!(origin.index_etag, "9b2cf535f27731c974343645a3985328");
    assert!(matches!(origin.bucket_policy, BucketPolicy::Document { .. }));
    assert_eq!(origin.url_response.status_code, 403);

    assert_eq!(traffic.downloads(), 1);
}

#[tokio::test]
async fn classifies_regional_s3_endpoint() {
    let (config, _dir) = test_config();
    let explorer = explorer(
        config,
        sokker_resolver(),
        Arc::new(sokker_traffic()),
        MemoryInventory::default(),
    );

    let target = explorer
        .resolve_target("https://s3.eu-west-1.amazonaws.com")
        .await
        .unwrap();

    assert_eq!(target.domain_name, "s3.eu-west-1.amazonaws.com");
    assert_eq!(target.registered_domain_name, "amazonaws.com");
    assert_eq!(target.target_service, "S3");
    // Not fetchable here, so nothing was captured.
    assert_eq!(target.url_response.status_code, 0);
    assert_eq!(target.etag_response, "");
}

#[tokio::test]
async fn cached_ip_ranges_are_reused() {
    let (config, _dir) = test_config();
    let traffic = Arc::new(sokker_traffic());
    let explorer = explorer(
        config,
        sokker_resolver(),
        traffic.clone(),
        sokker_inventory(),
    );

    let first = explorer
        .resolve_target("https://dev.sokker.info")
        .await
        .unwrap();
    let second = explorer
        .resolve_target("https://dev.sokker.info")
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(traffic.downloads(), 1);
}

#[tokio::test]
async fn existing_cache_file_is_used_without_download() {
    let (config, _dir) = test_config();
    std::fs::write(&config.ip_ranges_cache_path, IP_RANGES).unwrap();
    let traffic = Arc::new(sokker_traffic().without_ip_ranges());
    let explorer = explorer(
        config,
        sokker_resolver(),
        traffic.clone(),
        sokker_inventory(),
    );

    let target = explorer
        .resolve_target("https://dev.sokker.info")
        .await
        .unwrap();

    assert_eq!(target.target_service, "CLOUDFRONT");
    assert_eq!(traffic.downloads(), 0);
}

#[tokio::test]
async fn unavailable_ip_ranges_fail_the_exploration() {
    let (config, _dir) = test_config();
    let traffic = Arc::new(sokker_traffic().without_ip_ranges());
    let explorer = explorer(config, sokker_resolver(), traffic, sokker_inventory());

    let err = explorer
        .explore(Some("https://dev.sokker.info"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::IpRangesDownload { .. }), "{err:?}");
}

#[tokio::test]
async fn unresolved_domain_fails_the_exploration() {
    let (config, _dir) = test_config();
    let explorer = explorer(
        config,
        sokker_resolver(),
        Arc::new(sokker_traffic()),
        sokker_inventory(),
    );

    let err = explorer
        .explore(Some("https://nowhere.sokker.info"))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, Error::UnresolvedTarget(domain) if domain == "nowhere.sokker.info"),
        "{err:?}"
    );
}

#[tokio::test]
async fn no_matching_distribution_fails_the_exploration() {
    let (config, _dir) = test_config();
    let inventory = MemoryInventory::default().with_distributions(vec![distribution(
        "E0OTHER",
        "",
        vec![s3_origin("other.s3.eu-west-1.amazonaws.com")],
    )]);
    let explorer = explorer(
        config,
        sokker_resolver(),
        Arc::new(sokker_traffic()),
        inventory,
    );

    let err = explorer
        .explore(Some("https://dev.sokker.info"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoDistribution(_)), "{err:?}");
}

#[tokio::test]
async fn missing_bucket_is_reported_not_fatal() {
    let (config, _dir) = test_config();
    let inventory = MemoryInventory::default().with_distributions(vec![distribution(
        "E1SOKKER",
        "",
        vec![s3_origin("dev.sokker.info.s3.eu-west-1.amazonaws.com")],
    )]);
    let resolver = StaticResolver {
        lookup_fails: true,
        ..sokker_resolver()
    };
    let explorer = explorer(config, resolver, Arc::new(sokker_traffic()), inventory);

    let mapping = explorer
        .explore(Some("https://dev.sokker.info"))
        .await
        .unwrap();

    let origin = &mapping.cloud_front_origins[0];
    assert!(!origin.resource_exists);
    assert!(!origin.is_website);
    assert!(!origin.bucket_policy_is_public);
    assert_eq!(origin.index_etag, "");
    assert_eq!(origin.bucket_policy, BucketPolicy::Absent);

    let target = &mapping.target_domain;
    assert_eq!(target.waf_id, NONE);
    assert_eq!(target.route53_record, NONE);
    assert!(target.ns_lookup.is_empty());
}

#[tokio::test]
async fn api_gateway_origin_matches_api_domain() {
    let (config, _dir) = test_config();
    let inventory = MemoryInventory::default().with_distributions(vec![distribution(
        "E2API",
        "",
        vec![api_gateway_origin(
            "a1b2c3.execute-api.eu-west-1.amazonaws.com",
            "/prod",
        )],
    )]);
    let resolver = sokker_resolver().with("dev.api.sokker.info", [13, 32, 9, 9]);
    let traffic = sokker_traffic().with_response(
        "https://a1b2c3.execute-api.eu-west-1.amazonaws.com/prod",
        403,
        &[("x-amzn-errortype", "ForbiddenException")],
    );
    let explorer = explorer(config, resolver, Arc::new(traffic), inventory);

    let mapping = explorer
        .explore(Some("https://dev.api.sokker.info"))
        .await
        .unwrap();

    let origin = &mapping.cloud_front_origins[0];
    assert_eq!(origin.origin_type, OriginType::ApiGateway);
    assert_eq!(origin.origin_name, "a1b2c3");
    assert!(!origin.resource_exists);
    assert_eq!(origin.url_response.status_code, 403);
    assert_eq!(
        origin.url_response.header("x-amzn-errortype"),
        Some("ForbiddenException")
    );
}

#[tokio::test]
async fn falls_back_to_configured_request_url() {
    let (mut config, _dir) = test_config();
    config.default_request_url = Some("https://dev.sokker.info".to_string());
    let explorer = explorer(
        config,
        sokker_resolver(),
        Arc::new(sokker_traffic()),
        sokker_inventory(),
    );

    assert_eq!(
        explorer.request_url(None).unwrap(),
        "https://dev.sokker.info"
    );
    assert_eq!(
        explorer.request_url(Some("")).unwrap(),
        "https://dev.sokker.info"
    );
    assert_eq!(
        explorer.request_url(Some("https://s3.eu-west-1.amazonaws.com")).unwrap(),
        "https://s3.eu-west-1.amazonaws.com"
    );

    let mapping = explorer.explore(None).await.unwrap();
    assert_eq!(mapping.target_domain.domain_name, "dev.sokker.info");
}

#[tokio::test]
async fn missing_request_url_fails_the_exploration() {
    let (config, _dir) = test_config();
    let explorer = explorer(
        config,
        sokker_resolver(),
        Arc::new(sokker_traffic()),
        sokker_inventory(),
    );

    assert!(matches!(
        explorer.explore(None).await.unwrap_err(),
        Error::NoRequestUrl
    ));
    assert!(matches!(
        explorer.explore(Some("not a url")).await.unwrap_err(),
        Error::InvalidUrl(_)
    ));
}

#[tokio::test]
async fn unreadable_cache_file_is_replaced() {
    let (config, _dir) = test_config();
    std::fs::write(&config.ip_ranges_cache_path, &IP_RANGES[..60]).unwrap();
    let traffic = Arc::new(sokker_traffic());
    let explorer = explorer(
        config,
        sokker_resolver(),
        traffic.clone(),
        sokker_inventory(),
    );

    for _ in 0..2 {
        let target = explorer
            .resolve_target("https://dev.sokker.info")
            .await
            .unwrap();
        assert_eq!(target.target_service, "CLOUDFRONT");
    }
    assert_eq!(traffic.downloads(), 1);
}

#[tokio::test]
async fn concurrent_explorations_stay_separate() {
    let (config, _dir) = test_config();
    let mut inventory = sokker_inventory();
    inventory.distributions.push(distribution(
        "E2API",
        "",
        vec![api_gateway_origin(
            "a1b2c3.execute-api.eu-west-1.amazonaws.com",
            "/prod",
        )],
    ));
    let resolver = sokker_resolver()
        .with("dev.api.sokker.info", [13, 32, 9, 9])
        .slow(Duration::from_millis(20));
    let traffic = Arc::new(sokker_traffic().with_response(
        "https://a1b2c3.execute-api.eu-west-1.amazonaws.com/prod",
        403,
        &[],
    ));
    let explorer = explorer(config, resolver, traffic.clone(), inventory);

    let (site, api) = tokio::join!(
        explorer.explore(Some("https://dev.sokker.info")),
        explorer.explore(Some("https://dev.api.sokker.info")),
    );
    let (site, api) = (site.unwrap(), api.unwrap());

    assert_eq!(site.target_domain.domain_name, "dev.sokker.info");
    assert_eq!(site.target_domain.target_ip_address, "13.32.1.2");
    assert_eq!(site.target_domain.route53_record, "dev.sokker.info.");
    assert_eq!(site.cloud_front_origins.len(), 1);
    assert_eq!(site.cloud_front_origins[0].origin_type, OriginType::S3Bucket);

    assert_eq!(api.target_domain.domain_name, "dev.api.sokker.info");
    assert_eq!(api.target_domain.target_ip_address, "13.32.9.9");
    assert_eq!(api.target_domain.route53_record, NONE);
    assert_eq!(api.cloud_front_origins.len(), 1);
    assert_eq!(api.cloud_front_origins[0].origin_type, OriginType::ApiGateway);

    // The second exploration waited for the first one's download.
    assert_eq!(traffic.downloads(), 1);
}
