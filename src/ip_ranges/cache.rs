//! A file-backed cache of the AWS IP ranges document.
//!
//! When the cache file exists it's used as-is; nothing is downloaded. An optional max age
//! makes older files refresh, falling back to the stale copy if the refresh fails. A cache
//! file that doesn't parse is downloaded again, and downloads are written to a temporary file
//! that's renamed over the cache, so readers never see a partial document.
use crate::error::Error;
use crate::ip_ranges::IpRangeTable;
use crate::traffic::Traffic;
use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct IpRangesCache {
    path: PathBuf,
    url: String,
    max_age: Option<Duration>,
    // Serializes downloads so concurrent requests never read a half-written file.
    lock: Mutex<()>,
}

impl IpRangesCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>, max_age: Option<Duration>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
            max_age,
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the IP ranges table, downloading and caching it first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IpRangesDownload`] if there's no usable cache file and the download
    /// fails.
    ///
    /// Returns [`Error::InvalidJSON`] if the downloaded document isn't a valid IP ranges table.
    /// Invalid downloads are never written to the cache.
    ///
    /// Returns [`Error::IO`] if the cache file can't be read or written.
    pub async fn load(&self, traffic: &(dyn Traffic + Send + Sync)) -> Result<IpRangeTable, Error> {
        let _guard = self.lock.lock().await;
        match fs::metadata(&self.path).await {
            Ok(metadata) if self.is_stale(&metadata) => {
                tracing::info!("AWS ip-ranges cache is stale: {}", self.path.display());
                match self.download(traffic).await {
                    Ok(table) => return Ok(table),
                    Err(err) => {
                        tracing::warn!("failed to refresh AWS ip-ranges, using stale cache: {err}");
                    }
                }
            }
            Ok(_) => {
                tracing::info!(
                    "found AWS ip-ranges cache, skipping download: {}",
                    self.path.display()
                );
            }
            Err(err) if err.kind() == ErrorKind::NotFound => return self.download(traffic).await,
            Err(err) => return Err(Error::IO(err)),
        }
        match IpRangeTable::from_slice(&fs::read(&self.path).await?) {
            Ok(table) => Ok(table),
            Err(err) => {
                tracing::warn!(
                    "AWS ip-ranges cache {} is unreadable, downloading again: {err}",
                    self.path.display()
                );
                self.download(traffic).await
            }
        }
    }

    fn is_stale(&self, metadata: &Metadata) -> bool {
        let Some(max_age) = self.max_age else {
            return false;
        };
        metadata
            .modified()
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .is_some_and(|age| age >= max_age)
    }

    async fn download(&self, traffic: &(dyn Traffic + Send + Sync)) -> Result<IpRangeTable, Error> {
        let contents = traffic
            .download(&self.url)
            .await
            .map_err(|source| Error::IpRangesDownload {
                url: self.url.clone(),
                source: Box::new(source),
            })?;
        let table = IpRangeTable::from_slice(&contents)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let partial = self.partial_path();
        fs::write(&partial, &contents).await?;
        fs::rename(&partial, &self.path).await?;
        tracing::debug!("cached AWS ip-ranges to {}", self.path.display());
        Ok(table)
    }

    // Next to the cache so the rename stays on one filesystem.
    fn partial_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(ToOwned::to_owned)
            .unwrap_or_default();
        name.push(".partial");
        self.path.with_file_name(name)
    }
}
