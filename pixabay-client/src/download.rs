//! Download helper for hit URLs
//!
//! Fetches a remote file into memory or onto disk. A response that is not
//! a success, or that carries no data at all, is a
//! [`PixabayError::Download`].

use std::path::Path;
use std::sync::LazyLock;

use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{bytes_with_limit, PixabayError};

/// Redirects followed before giving up. CDN URLs commonly redirect once.
const MAX_REDIRECTS: usize = 5;

static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    build_client(&ClientConfig::default()).expect("Failed to build download HTTP client")
});

fn build_client(config: &ClientConfig) -> Result<Client, PixabayError> {
    Ok(Client::builder()
        .connect_timeout(config.connect_timeout())
        .timeout(config.timeout())
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()?)
}

#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Default for Downloader {
    fn default() -> Self {
        Self {
            client: SHARED_CLIENT.clone(),
        }
    }
}

impl Downloader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Downloader with the timeouts and user agent from `config`.
    pub fn with_config(config: &ClientConfig) -> Result<Self, PixabayError> {
        Ok(Self {
            client: build_client(config)?,
        })
    }

    /// Download `url` into memory.
    pub async fn download(&self, url: &str) -> Result<Bytes, PixabayError> {
        let parsed = Url::parse(url).map_err(|e| download_error(url, e))?;
        debug!(url = %parsed, "Downloading");

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| download_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_error(url, format!("HTTP {status}")));
        }

        let data = bytes_with_limit(response).await.map_err(|e| match e {
            PixabayError::Transport(reason) => download_error(url, reason),
            other => other,
        })?;
        if data.is_empty() {
            return Err(download_error(url, "no data received"));
        }
        Ok(data)
    }

    /// Download `url` and write it to `path`, returning the number of bytes
    /// written. Nothing is written when the download fails.
    pub async fn download_to(&self, url: &str, path: impl AsRef<Path>) -> Result<u64, PixabayError> {
        let path = path.as_ref();
        let data = self.download(url).await?;
        tokio::fs::write(path, &data).await?;
        info!(url, path = %path.display(), bytes = data.len(), "Download saved");
        Ok(data.len() as u64)
    }
}

/// Last path segment of `url`, if it has one.
#[must_use]
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn download_error(url: &str, reason: impl ToString) -> PixabayError {
    PixabayError::Download {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url("https://cdn.pixabay.com/photo/2013/10/15/09/12/flower-195893_150.jpg"),
            Some("flower-195893_150.jpg".to_string())
        );
        assert_eq!(
            file_name_from_url("https://i.vimeocdn.com/video/529927645_295x166.jpg?x=1"),
            Some("529927645_295x166.jpg".to_string())
        );
        assert_eq!(file_name_from_url("https://pixabay.com/"), None);
        assert_eq!(file_name_from_url("not a url"), None);
    }

    #[tokio::test]
    async fn test_download_rejects_invalid_url() {
        let err = Downloader::new().download("not a url").await.unwrap_err();
        assert!(matches!(err, PixabayError::Download { ref url, .. } if url == "not a url"));
    }
}
