//! Integration tests for the search pipeline
//!
//! A recording in-memory transport stands in for the network so every
//! request URL can be inspected and every response is fixed.
//!
//! Run with: cargo test --test api_tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use pixabay_client::{
    Category, Color, ImageApi, ImageSearchParams, ImageType, Order, Orientation, PixabayError, RawResponse,
    Transport, VideoApi, VideoSearchParams, VideoType,
};

const IMAGES_FIXTURE: &str = include_str!("fixtures/images.json");
const VIDEOS_FIXTURE: &str = include_str!("fixtures/videos.json");

/// Transport returning a canned response and recording requested URLs.
struct RecordingTransport {
    status: u16,
    header_lines: Vec<String>,
    body: &'static str,
    requests: Mutex<Vec<Url>>,
}

impl RecordingTransport {
    fn new(status: u16, body: &'static str) -> Arc<Self> {
        Self::with_headers(status, body, &[])
    }

    fn with_headers(status: u16, body: &'static str, headers: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            status,
            header_lines: headers.iter().map(|h| (*h).to_string()).collect(),
            body,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn get(&self, url: Url) -> Result<RawResponse, PixabayError> {
        self.requests.lock().unwrap().push(url);
        Ok(RawResponse {
            status: self.status,
            header_lines: self.header_lines.clone(),
            body: Bytes::from_static(self.body.as_bytes()),
        })
    }
}

/// Transport that always fails at the network level.
struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn get(&self, _url: Url) -> Result<RawResponse, PixabayError> {
        Err(PixabayError::Transport("connection refused".to_string()))
    }
}

fn query_of(url: &Url) -> Vec<(String, String)> {
    url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
}

#[tokio::test]
async fn test_image_fetch_builds_page() {
    let transport = RecordingTransport::with_headers(
        200,
        IMAGES_FIXTURE,
        &[
            "content-type: application/json",
            "x-ratelimit-limit: 100",
            "x-ratelimit-remaining: 99",
            "x-ratelimit-reset: 0",
        ],
    );
    let api = ImageApi::new("test-key").with_transport(transport.clone());

    let page = api.fetch(&ImageSearchParams::new().query("flower")).await.unwrap();

    assert_eq!(page.total, 1000);
    assert_eq!(page.total_hits, 500);
    assert_eq!(page.headers["Content-Type"], "application/json");
    assert_eq!(page.rate_limit().remaining, Some(99));

    let image = &page.images()[0];
    assert_eq!(image.tags, vec!["blossom", "bloom", "flower"]);
    assert_eq!(image.url_for_size_180(), "https://pixabay.com/get/35bbf209e13e39d2_180.jpg");
}

#[tokio::test]
async fn test_image_request_url() {
    let transport = RecordingTransport::new(200, IMAGES_FIXTURE);
    let api = ImageApi::new("test-key").with_transport(transport.clone());

    let search = ImageSearchParams::new()
        .query("Kitten")
        .category(Category::Animals)
        .image_type(ImageType::Photo)
        .orientation(Orientation::Horizontal)
        .colors([Color::Green, Color::Orange])
        .per_page(20)
        .safe_search(true)
        .editors_choice(true)
        .order(Order::Popular);
    api.fetch(&search).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let url = &requests[0];
    assert_eq!(url.path(), "/api/");
    assert_eq!(
        query_of(url),
        vec![
            ("q".to_string(), "kitten".to_string()),
            ("image_type".to_string(), "photo".to_string()),
            ("orientation".to_string(), "horizontal".to_string()),
            ("category".to_string(), "animals".to_string()),
            ("colors".to_string(), "green,orange".to_string()),
            ("editors_choice".to_string(), "true".to_string()),
            ("safe_search".to_string(), "true".to_string()),
            ("order".to_string(), "popular".to_string()),
            ("per_page".to_string(), "20".to_string()),
            ("key".to_string(), "test-key".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_video_fetch_builds_page() {
    let transport = RecordingTransport::new(200, VIDEOS_FIXTURE);
    let api = VideoApi::new("test-key").with_transport(transport.clone());

    let search = VideoSearchParams::new()
        .video_type(VideoType::Film)
        .category(Category::Nature)
        .per_page(3);
    let page = api.fetch(&search).await.unwrap();

    assert_eq!(transport.requests()[0].path(), "/api/videos/");
    assert_eq!(page.total, 4692);

    let video = &page.videos()[0];
    assert!(video.large().is_none());
    assert_eq!(video.medium().width, 1280);
    assert_eq!(video.tiny().size, 1005320);
    assert_eq!(video.duration, 12);
    assert_eq!(video.preview_image_640x360(), "https://i.vimeocdn.com/video/529927645_640x360.jpg");
}

#[tokio::test]
async fn test_invalid_search_never_reaches_transport() {
    let transport = RecordingTransport::new(200, IMAGES_FIXTURE);
    let api = ImageApi::new("test-key").with_transport(transport.clone());

    let err = api.fetch(&ImageSearchParams::new().per_page(101)).await.unwrap_err();
    assert!(matches!(err, PixabayError::InvalidValue { ref param, .. } if param == "per_page"));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_search_is_reusable_across_fetches() {
    let transport = RecordingTransport::new(200, IMAGES_FIXTURE);
    let api = ImageApi::new("test-key").with_transport(transport.clone());

    let search = ImageSearchParams::new().query("sea").page(1);
    api.fetch(&search).await.unwrap();
    api.fetch(&search).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], requests[1]);
    assert_eq!(search.page, Some(1));
}

#[tokio::test]
async fn test_rate_limited() {
    let transport = RecordingTransport::with_headers(
        429,
        "[ERROR 429] API key rate limit exceeded",
        &["X-RateLimit-Reset: 30"],
    );
    let api = ImageApi::new("test-key").with_transport(transport);

    let err = api.fetch(&ImageSearchParams::new()).await.unwrap_err();
    assert!(matches!(err, PixabayError::RateLimited { reset_seconds: Some(30) }));
}

#[tokio::test]
async fn test_invalid_api_key() {
    let transport = RecordingTransport::new(400, "[ERROR 400] Invalid or missing API key");
    let api = VideoApi::new("bad-key").with_transport(transport);

    let err = api.fetch(&VideoSearchParams::new()).await.unwrap_err();
    assert!(matches!(err, PixabayError::InvalidApiKey(ref key) if key == "bad-key"));
    assert_eq!(err.to_string(), "The supplied API key 'bad-key' has been declined");
}

#[tokio::test]
async fn test_upstream_error() {
    let transport = RecordingTransport::new(503, "Service Unavailable");
    let api = ImageApi::new("test-key").with_transport(transport);

    let err = api.fetch(&ImageSearchParams::new()).await.unwrap_err();
    assert!(matches!(err, PixabayError::Upstream { status: 503, ref body } if body == "Service Unavailable"));
}

#[tokio::test]
async fn test_malformed_response() {
    let transport = RecordingTransport::new(200, "<html>not json</html>");
    let api = ImageApi::new("test-key").with_transport(transport);

    let err = api.fetch(&ImageSearchParams::new()).await.unwrap_err();
    assert!(matches!(err, PixabayError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_transport_failure_is_wrapped() {
    let api = ImageApi::new("test-key").with_transport(Arc::new(FailingTransport));

    let err = api.fetch(&ImageSearchParams::new()).await.unwrap_err();
    let PixabayError::Transport(reason) = err else {
        panic!("expected transport error, got {err:?}");
    };
    assert!(reason.contains("https://pixabay.com/api/"));
    assert!(reason.contains("connection refused"));
    assert!(!reason.contains("test-key"));
}
