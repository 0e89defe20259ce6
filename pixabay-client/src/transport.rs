//! HTTP transport
//!
//! The client never talks to the network directly: it hands a fully built
//! URL to a [`Transport`] and gets back the status, raw header lines and
//! body. [`ReqwestTransport`] is the production implementation; tests plug
//! in their own.

use std::sync::LazyLock;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONNECTION, USER_AGENT};
use reqwest::Client;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{bytes_with_limit, PixabayError};

/// Client used by [`ReqwestTransport::default`].
/// Connections are not kept alive between requests and redirects are not
/// followed.
static DEFAULT_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    build_client(&ClientConfig::default()).expect("Failed to build Pixabay HTTP client")
});

/// Raw outcome of one GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Header lines as `Name: value`, in the order received.
    pub header_lines: Vec<String>,
    pub body: Bytes,
}

impl RawResponse {
    /// Body decoded as UTF-8, with invalid sequences replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs a single GET request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url`. Any HTTP status is a successful transport outcome; only
    /// network-level failures are errors.
    async fn get(&self, url: Url) -> Result<RawResponse, PixabayError>;
}

/// [`Transport`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self {
            client: DEFAULT_CLIENT.clone(),
        }
    }
}

impl ReqwestTransport {
    /// Build a transport with the timeouts and user agent from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, PixabayError> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

fn build_client(config: &ClientConfig) -> Result<Client, PixabayError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent)
            .map_err(|e| PixabayError::InvalidConfig(format!("invalid user_agent: {e}")))?,
    );

    Ok(Client::builder()
        .connect_timeout(config.connect_timeout())
        .timeout(config.timeout())
        .pool_max_idle_per_host(0)
        .redirect(reqwest::redirect::Policy::none())
        .default_headers(headers)
        .build()?)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: Url) -> Result<RawResponse, PixabayError> {
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        let header_lines = response
            .headers()
            .iter()
            .map(|(name, value)| format!("{}: {}", name.as_str(), String::from_utf8_lossy(value.as_bytes())))
            .collect();
        let body = bytes_with_limit(response).await?;

        Ok(RawResponse {
            status,
            header_lines,
            body,
        })
    }
}
