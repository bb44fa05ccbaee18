//! Plain HTTP traffic: fetching the explored URL and its origins, and downloading the AWS IP
//! ranges document.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

/// Status and headers of a fetched URL. A header sent with several values appears once per
/// value. The default value (status `0`, no headers) stands for a fetch that didn't happen or
/// failed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UrlResponse {
    pub status_code: u16,
    pub headers: Vec<HttpHeader>,
}

impl UrlResponse {
    /// First value of the named header, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

#[allow(clippy::module_name_repetitions)]
pub type DynTraffic = Arc<dyn Traffic + Send + Sync>;

#[async_trait::async_trait]
pub trait Traffic {
    /// `GET` the URL, returning its status and headers whatever the status is.
    async fn get(&self, url: &str) -> Result<UrlResponse, Error>;

    /// `GET` the URL and return its body, failing on non-success statuses.
    async fn download(&self, url: &str) -> Result<Vec<u8>, Error>;
}

/// [`Traffic`] over a shared [`reqwest::Client`]. Redirects are followed.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTraffic {
    client: reqwest::Client,
}

impl ReqwestTraffic {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Traffic for ReqwestTraffic {
    async fn get(&self, url: &str) -> Result<UrlResponse, Error> {
        let response = self.client.get(url).send().await?;
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| HttpHeader {
                name: name.to_string(),
                value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            })
            .collect();
        Ok(UrlResponse {
            status_code: response.status().as_u16(),
            headers,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, Error> {
        tracing::info!("downloading {url}");
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Strip the quote characters S3 wraps ETags in.
#[must_use]
pub fn clean_etag(etag: &str) -> String {
    etag.replace('"', "")
}
