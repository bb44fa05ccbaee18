//! Columbus
//!
//! Finds out where a URL lives in AWS. Given something like `https://dev.api.sokker.info`,
//! Columbus resolves the domain, tells which AWS service owns the address according to the
//! published [AWS IP ranges], finds the [CloudFront] distribution fronting the domain and
//! inspects its origins (S3 buckets, S3 websites, API Gateway endpoints) along with the
//! domain's [Route53] record.
//!
//! The result is served as JSON by a small HTTP API, see [`api`].
//!
//! [AWS IP ranges]: https://docs.aws.amazon.com/vpc/latest/userguide/aws-ip-ranges.html
//! [CloudFront]: https://aws.amazon.com/cloudfront/
//! [Route53]: https://aws.amazon.com/route53/
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod dns;
pub mod error;
pub mod explore;
pub mod inventory;
pub mod ip_ranges;
pub mod mapping;
pub mod traffic;

pub use api::new as new_http;
pub use config::{Config, SharedConfig};
pub use dns::TrustDnsResolver;
pub use explore::{Explorer, SharedExplorer};
pub use inventory::{MemoryInventory, SdkInventory};
pub use mapping::AwsMapping;
pub use traffic::ReqwestTraffic;
