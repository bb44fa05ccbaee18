use crate::error::Error;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub type SharedConfig = Arc<Config>;

/// Environment variable providing a request URL when `/explore` is called without one.
pub const REQUEST_URL_ENV: &str = "COLUMBUS_REQUEST_URL";

/// Environment variable naming the object whose ETag is looked up in S3 origins.
pub const INDEX_FILEPATH_ENV: &str = "COLUMBUS_INDEX_FILEPATH";

pub const DEFAULT_IP_RANGES_URL: &str = "https://ip-ranges.amazonaws.com/ip-ranges.json";

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
    pub dns_server: SocketAddr,
    pub aws_region: String,
    pub ip_ranges_url: String,
    pub ip_ranges_cache_path: PathBuf,
    /// When unset, an existing cache file is used no matter how old it is.
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    pub ip_ranges_max_age: Option<Duration>,
    pub index_file_path: String,
    pub default_request_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            api_timeout: Duration::from_secs(120),
            dns_server: SocketAddr::from(([1, 1, 1, 1], 53)),
            aws_region: "eu-west-1".to_string(),
            ip_ranges_url: DEFAULT_IP_RANGES_URL.to_string(),
            ip_ranges_cache_path: PathBuf::from(".ip-ranges.json"),
            ip_ranges_max_age: None,
            index_file_path: "index.html".to_string(),
            default_request_url: None,
        }
    }
}

impl Config {
    /// Load a JSON config file, then apply the environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the file can't be read and [`Error::InvalidJSON`] if it isn't a
    /// valid config.
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        Ok(conf.with_env_overrides())
    }

    #[must_use]
    pub fn from_env() -> Self {
        Config::default().with_env_overrides()
    }

    /// Apply the `COLUMBUS_*` environment variables on top of this config. Empty values are
    /// ignored.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value_of = |key: &str| lookup(key).filter(|value| !value.is_empty());
        if let Some(request_url) = value_of(REQUEST_URL_ENV) {
            self.default_request_url = Some(request_url);
        }
        if let Some(index_file_path) = value_of(INDEX_FILEPATH_ENV) {
            self.index_file_path = index_file_path;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_production_deployment() {
        let config = Config::default();
        assert_eq!(config.dns_server.to_string(), "1.1.1.1:53");
        assert_eq!(config.aws_region, "eu-west-1");
        assert_eq!(config.index_file_path, "index.html");
        assert_eq!(config.ip_ranges_cache_path, PathBuf::from(".ip-ranges.json"));
        assert!(config.ip_ranges_max_age.is_none());
        assert!(config.default_request_url.is_none());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "aws_region": "us-east-1", "api_timeout": 5, "ip_ranges_max_age": 86400 }"#,
        )
        .unwrap();
        assert_eq!(config.aws_region, "us-east-1");
        assert_eq!(config.api_timeout, Duration::from_secs(5));
        assert_eq!(config.ip_ranges_max_age, Some(Duration::from_secs(86_400)));
        assert_eq!(config.api_bind_addr.port(), 8080);
    }

    #[test]
    fn env_overrides_request_url_and_index_path() {
        let env = HashMap::from([
            (REQUEST_URL_ENV, "https://dev.sokker.info"),
            (INDEX_FILEPATH_ENV, "app/index.html"),
        ]);
        let config = Config::default().with_overrides(|key| env.get(key).map(ToString::to_string));
        assert_eq!(
            config.default_request_url.as_deref(),
            Some("https://dev.sokker.info")
        );
        assert_eq!(config.index_file_path, "app/index.html");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config = Config::default().with_overrides(|_| Some(String::new()));
        assert!(config.default_request_url.is_none());
        assert_eq!(config.index_file_path, "index.html");
    }
}
