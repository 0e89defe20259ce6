//! Pixabay API client
//!
//! One [`Api`] per resource kind. The request/response pipeline is shared;
//! an [`Endpoint`] only supplies the path suffix, the search and hit types,
//! and an optional hook that adjusts the search before it is rendered.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::PixabayError;
use crate::headers::parse_header_lines;
use crate::page::{Image, Page, RateLimit, Video};
use crate::search::{ImageFilters, SearchParams, SearchVariant, VideoFilters};
use crate::transport::{ReqwestTransport, Transport};

/// One searchable resource kind.
pub trait Endpoint: Send + Sync {
    type Filters: SearchVariant;
    type Hit: DeserializeOwned;

    /// Path relative to the API root, e.g. `"videos/"`.
    const PATH: &'static str;

    /// Adjust a search before rendering. Identity by default.
    fn prepare<'a>(&self, search: &'a SearchParams<Self::Filters>) -> Cow<'a, SearchParams<Self::Filters>> {
        Cow::Borrowed(search)
    }
}

/// Image search at the API root.
#[derive(Debug, Clone, Copy, Default)]
pub struct Images;

/// Video search under `videos/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Videos;

impl Endpoint for Images {
    type Filters = ImageFilters;
    type Hit = Image;
    const PATH: &'static str = "";
}

impl Endpoint for Videos {
    type Filters = VideoFilters;
    type Hit = Video;
    const PATH: &'static str = "videos/";
}

/// Client bound to one endpoint and one API key.
pub struct Api<E> {
    key: String,
    base_url: Url,
    endpoint: E,
    transport: Arc<dyn Transport>,
}

pub type ImageApi = Api<Images>;
pub type VideoApi = Api<Videos>;

impl<E> fmt::Debug for Api<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl<E: Endpoint + Default> Api<E> {
    /// Client against the public API with default settings.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            base_url: default_base_url(),
            endpoint: E::default(),
            transport: Arc::new(ReqwestTransport::default()),
        }
    }

    /// Client built from configuration. The key must be present.
    pub fn with_config(config: &ClientConfig) -> Result<Self, PixabayError> {
        let key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PixabayError::InvalidConfig("api_key is required".to_string()))?;
        let base_url = config.validate()?;
        Ok(Self {
            key,
            base_url,
            endpoint: E::default(),
            transport: Arc::new(ReqwestTransport::new(config)?),
        })
    }
}

impl<E: Endpoint> Api<E> {
    /// Client with an explicit endpoint value, e.g. one that overrides
    /// [`Endpoint::prepare`].
    pub fn with_endpoint(key: impl Into<String>, endpoint: E) -> Self {
        Self {
            key: key.into(),
            base_url: default_base_url(),
            endpoint,
            transport: Arc::new(ReqwestTransport::default()),
        }
    }

    /// Replace the transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the API root. A missing trailing `/` is added.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, PixabayError> {
        self.base_url = ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        }
        .validate()?;
        Ok(self)
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn endpoint_url(&self) -> Url {
        // PATH is a relative literal; joining it onto a base ending in '/' cannot fail.
        self.base_url
            .join(E::PATH)
            .unwrap_or_else(|_| self.base_url.clone())
    }

    /// Full request URL for `search`: validated parameters followed by the key.
    pub fn request_url(&self, search: &SearchParams<E::Filters>) -> Result<Url, PixabayError> {
        let prepared = self.endpoint.prepare(search);
        let rendered = prepared.render()?;

        let mut url = self.endpoint_url();
        {
            let mut pairs = url.query_pairs_mut();
            for (param, value) in &rendered {
                pairs.append_pair(param.as_str(), &value.to_string());
            }
            pairs.append_pair("key", &self.key);
        }
        Ok(url)
    }

    /// Run one search and return the decoded page.
    ///
    /// Nothing is retried; a [`PixabayError::RateLimited`] is returned to
    /// the caller as is.
    pub async fn fetch(&self, search: &SearchParams<E::Filters>) -> Result<Page<E::Hit>, PixabayError> {
        let url = self.request_url(search)?;
        let endpoint = self.endpoint_url();
        debug!(endpoint = %endpoint, "Sending Pixabay search request");

        let response = self.transport.get(url).await.map_err(|e| match e {
            PixabayError::Transport(reason) => {
                warn!(endpoint = %endpoint, error = %reason, "Pixabay request failed");
                PixabayError::Transport(format!("GET {endpoint}: {reason}"))
            }
            other => other,
        })?;

        let headers = parse_header_lines(&response.header_lines);
        let body = response.text();
        classify(response.status, &body, &self.key, &headers)?;

        let json: serde_json::Value = serde_json::from_str(&body)?;
        let page = Page::from_json(json, headers)?;
        debug!(
            endpoint = %endpoint,
            total = page.total,
            total_hits = page.total_hits,
            hits = page.hits.len(),
            "Pixabay search completed"
        );
        Ok(page)
    }
}

/// Map an HTTP status and body onto success or the matching error.
///
/// 200 and 201 succeed. 429 is always [`PixabayError::RateLimited`]. Any
/// other status is [`PixabayError::InvalidApiKey`] when the body mentions
/// "API key", otherwise [`PixabayError::Upstream`].
pub fn classify(
    status: u16,
    body: &str,
    key: &str,
    headers: &HashMap<String, String>,
) -> Result<(), PixabayError> {
    match status {
        200 | 201 => Ok(()),
        429 => {
            let reset_seconds = RateLimit::from_headers(headers).reset_seconds;
            warn!(?reset_seconds, "Pixabay rate limit exceeded");
            Err(PixabayError::RateLimited { reset_seconds })
        }
        _ if body.contains("API key") => {
            warn!(status, "Pixabay declined the API key");
            Err(PixabayError::InvalidApiKey(key.to_string()))
        }
        _ => {
            warn!(status, "Pixabay returned an error response");
            Err(PixabayError::Upstream {
                status,
                body: body.to_string(),
            })
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{Color, VideoType};
    use crate::search::{ImageSearchParams, VideoSearchParams};

    fn no_headers() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_classify_success() {
        assert!(classify(200, "{}", "k", &no_headers()).is_ok());
        assert!(classify(201, "{}", "k", &no_headers()).is_ok());
    }

    #[test]
    fn test_classify_rate_limited_ignores_body() {
        let headers = HashMap::from([("X-Ratelimit-Reset".to_string(), "17".to_string())]);
        let err = classify(429, "[ERROR 400] Invalid or missing API key", "k", &headers).unwrap_err();
        assert!(matches!(err, PixabayError::RateLimited { reset_seconds: Some(17) }));
    }

    #[test]
    fn test_classify_invalid_api_key() {
        let err = classify(400, "[ERROR 400] Invalid or missing API key", "my-key", &no_headers()).unwrap_err();
        assert!(matches!(err, PixabayError::InvalidApiKey(ref key) if key == "my-key"));
    }

    #[test]
    fn test_classify_upstream() {
        let err = classify(500, "[ERROR 500] Internal error", "k", &no_headers()).unwrap_err();
        assert!(matches!(err, PixabayError::Upstream { status: 500, ref body } if body == "[ERROR 500] Internal error"));

        let err = classify(204, "", "k", &no_headers()).unwrap_err();
        assert!(matches!(err, PixabayError::Upstream { status: 204, .. }));
    }

    #[test]
    fn test_endpoint_urls() {
        assert_eq!(ImageApi::new("k").endpoint_url().as_str(), "https://pixabay.com/api/");
        assert_eq!(VideoApi::new("k").endpoint_url().as_str(), "https://pixabay.com/api/videos/");
    }

    #[test]
    fn test_request_url_appends_key_last() {
        let api = ImageApi::new("abc123");
        let search = ImageSearchParams::new()
            .query("yellow flowers")
            .colors([Color::Green, Color::Orange])
            .editors_choice(true)
            .per_page(3);
        let url = api.request_url(&search).unwrap();
        assert_eq!(
            url.as_str(),
            "https://pixabay.com/api/?q=yellow+flowers&colors=green%2Corange&editors_choice=true&per_page=3&key=abc123"
        );
    }

    #[test]
    fn test_request_url_rejects_invalid_search() {
        let api = VideoApi::new("k");
        let search = VideoSearchParams::new().video_type(VideoType::Film).per_page(101);
        assert!(matches!(api.request_url(&search), Err(PixabayError::InvalidValue { .. })));
    }

    #[test]
    fn test_with_base_url() {
        let api = VideoApi::new("k").with_base_url("http://localhost:9000/api").unwrap();
        assert_eq!(api.endpoint_url().as_str(), "http://localhost:9000/api/videos/");
        assert!(VideoApi::new("k").with_base_url("localhost").is_err());
    }

    #[test]
    fn test_with_config_requires_key() {
        let config = ClientConfig::default();
        assert!(matches!(ImageApi::with_config(&config), Err(PixabayError::InvalidConfig(_))));

        let config = ClientConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        assert_eq!(ImageApi::with_config(&config).unwrap().key(), "k");
    }

    #[test]
    fn test_debug_hides_key() {
        let rendered = format!("{:?}", ImageApi::new("secret"));
        assert!(!rendered.contains("secret"));
    }

    #[derive(Default)]
    struct SafeImages;

    impl Endpoint for SafeImages {
        type Filters = ImageFilters;
        type Hit = Image;
        const PATH: &'static str = "";

        fn prepare<'a>(&self, search: &'a ImageSearchParams) -> Cow<'a, ImageSearchParams> {
            Cow::Owned(search.clone().safe_search(true))
        }
    }

    #[test]
    fn test_prepare_hook_does_not_mutate_caller_search() {
        let api = Api::with_endpoint("k", SafeImages);
        let search = ImageSearchParams::new().query("cat");
        let url = api.request_url(&search).unwrap();
        assert!(url.as_str().contains("safe_search=true"));
        assert_eq!(search.safe_search, None);
    }
}
