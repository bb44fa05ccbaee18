//! HTTP API for exploring URLs.
//!
//! # API Endpoints
//!
//! ## `/` (GET)
//!
//!   Returns HTTP 200 (OK) and a plain text hint on how to query `/explore`.
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/explore` (GET)
//!
//!   Expects the URL to explore in the `requestUrl` query parameter:
//!
//!   ```text
//!   /explore?requestUrl=https://dev.api.sokker.info
//!   ```
//!
//!  Without it, the URL from the `COLUMBUS_REQUEST_URL` environment variable is explored.
//!
//!  For successful explorations, returns HTTP 200 (OK) and the
//!  [`AwsMapping`][crate::mapping::AwsMapping] as a JSON response body.
//!
//!  Failed explorations return a JSON response body of the form:
//!
//!  ```json
//!  { "error": "no CloudFront distribution found for \"dev.api.sokker.info\"" }
//!  ```
//!
//!  with one of these statuses:
//!
//!  * HTTP 400 (Bad Request) when there's no URL to explore, or it has no host.
//!  * HTTP 404 (Not Found) when no CloudFront distribution fronts the domain.
//!  * HTTP 408 (Request Timeout) when the exploration takes longer than the configured
//!    `api_timeout`.
//!  * HTTP 502 (Bad Gateway) when the domain can't be resolved.
//!  * HTTP 500 (Internal Server Error) for everything else, e.g. when the AWS IP ranges can't be
//!    downloaded or CloudFront can't be listed.

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::{new, router};
