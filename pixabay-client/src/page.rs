//! Result pages and hit records
//!
//! A [`Page`] is built once from the decoded JSON body plus the captured
//! response headers and is read-only afterwards.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::enums::VideoPreviewSize;
use crate::error::PixabayError;

/// URL template of the still preview rendered for every video.
pub const VIDEO_PREVIEW_URL: &str = "https://i.vimeocdn.com/video/";

// Pattern is a compile-time constant; Regex::new cannot fail on it.
static RE_SIZE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_640(\.\w+)$").expect("invalid size marker regex"));

static RE_TAG_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*").expect("invalid tag separator regex"));

/// Rate limit counters reported by the API on every response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// Maximum number of requests in the current window.
    pub limit: Option<u64>,
    /// Requests left in the current window.
    pub remaining: Option<u64>,
    /// Seconds until the window resets.
    pub reset_seconds: Option<u64>,
}

impl RateLimit {
    #[must_use]
    pub fn from_headers(headers: &HashMap<String, String>) -> Self {
        let read = |name: &str| headers.get(name).and_then(|v| v.trim().parse().ok());
        Self {
            limit: read("X-Ratelimit-Limit"),
            remaining: read("X-Ratelimit-Remaining"),
            reset_seconds: read("X-Ratelimit-Reset"),
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone)]
pub struct Page<H> {
    /// Total number of matches.
    pub total: u64,
    /// Number of matches reachable through the API.
    pub total_hits: u64,
    /// Response headers, keyed by title-cased name.
    pub headers: HashMap<String, String>,
    pub hits: Vec<H>,
}

pub type ImagePage = Page<Image>;
pub type VideoPage = Page<Video>;

#[derive(Deserialize)]
struct RawPage<H> {
    total: u64,
    #[serde(rename = "totalHits")]
    total_hits: u64,
    #[serde(default = "Vec::new")]
    hits: Vec<H>,
}

impl<H: DeserializeOwned> Page<H> {
    /// Build a page from a decoded response body.
    pub fn from_json(body: Value, headers: HashMap<String, String>) -> Result<Self, PixabayError> {
        let raw: RawPage<H> = serde_json::from_value(body)?;
        Ok(Self {
            total: raw.total,
            total_hits: raw.total_hits,
            headers,
            hits: raw.hits,
        })
    }
}

impl<H> Page<H> {
    #[must_use]
    pub fn rate_limit(&self) -> RateLimit {
        RateLimit::from_headers(&self.headers)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&crate::headers::normalize_header_name(name))
            .map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

impl ImagePage {
    #[must_use]
    pub fn images(&self) -> &[Image] {
        &self.hits
    }
}

impl VideoPage {
    #[must_use]
    pub fn videos(&self) -> &[Video] {
        &self.hits
    }
}

/// A single image hit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Image {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "split_tags")]
    pub tags: Vec<String>,
    #[serde(rename = "pageURL")]
    pub page_url: String,
    #[serde(rename = "largeImageURL")]
    pub large_image_url: String,
    #[serde(rename = "previewURL")]
    pub preview_url: String,
    #[serde(rename = "previewWidth")]
    pub preview_width: u32,
    #[serde(rename = "previewHeight")]
    pub preview_height: u32,
    #[serde(rename = "webformatURL")]
    pub webformat_url: String,
    #[serde(rename = "webformatWidth")]
    pub webformat_width: u32,
    #[serde(rename = "webformatHeight")]
    pub webformat_height: u32,
    pub views: u64,
    pub downloads: u64,
    pub likes: u64,
    pub comments: u64,
    pub user_id: u64,
    pub user: String,
    #[serde(rename = "userImageURL")]
    pub user_image_url: String,
}

impl Image {
    /// Web-format URL with its `_640` resolution marker swapped for `size`.
    ///
    /// Purely textual; if the URL carries no marker it is returned as is.
    #[must_use]
    pub fn url_for_size(&self, size: u32) -> String {
        RE_SIZE_MARKER
            .replace(&self.webformat_url, format!("_{size}${{1}}"))
            .into_owned()
    }

    #[must_use]
    pub fn url_for_size_180(&self) -> String {
        self.url_for_size(180)
    }

    #[must_use]
    pub fn url_for_size_340(&self) -> String {
        self.url_for_size(340)
    }

    #[must_use]
    pub fn url_for_size_640(&self) -> String {
        self.url_for_size(640)
    }

    #[must_use]
    pub fn url_for_size_960(&self) -> String {
        self.url_for_size(960)
    }
}

/// A single video hit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Video {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "split_tags")]
    pub tags: Vec<String>,
    #[serde(rename = "pageURL")]
    pub page_url: String,
    /// Duration in seconds.
    pub duration: u64,
    #[serde(deserialize_with = "string_or_number")]
    pub picture_id: String,
    pub videos: VideoSet,
    pub views: u64,
    pub downloads: u64,
    pub likes: u64,
    pub comments: u64,
    pub user_id: u64,
    pub user: String,
    #[serde(rename = "userImageURL")]
    pub user_image_url: String,
}

impl Video {
    /// URL of the still preview image at the requested size.
    #[must_use]
    pub fn preview_image(&self, size: VideoPreviewSize) -> String {
        format!("{VIDEO_PREVIEW_URL}{}_{}.jpg", self.picture_id, size.as_str())
    }

    #[must_use]
    pub fn preview_image_100x75(&self) -> String {
        self.preview_image(VideoPreviewSize::Size100x75)
    }

    #[must_use]
    pub fn preview_image_200x150(&self) -> String {
        self.preview_image(VideoPreviewSize::Size200x150)
    }

    #[must_use]
    pub fn preview_image_295x166(&self) -> String {
        self.preview_image(VideoPreviewSize::Size295x166)
    }

    #[must_use]
    pub fn preview_image_640x360(&self) -> String {
        self.preview_image(VideoPreviewSize::Size640x360)
    }

    #[must_use]
    pub fn preview_image_960x540(&self) -> String {
        self.preview_image(VideoPreviewSize::Size960x540)
    }

    #[must_use]
    pub fn preview_image_1920x1080(&self) -> String {
        self.preview_image(VideoPreviewSize::Size1920x1080)
    }

    /// Largest rendition, typically 1920x1080. Not always available.
    #[must_use]
    pub fn large(&self) -> Option<&VideoItem> {
        self.videos.large.as_ref()
    }

    #[must_use]
    pub fn medium(&self) -> &VideoItem {
        &self.videos.medium
    }

    #[must_use]
    pub fn small(&self) -> &VideoItem {
        &self.videos.small
    }

    #[must_use]
    pub fn tiny(&self) -> &VideoItem {
        &self.videos.tiny
    }
}

/// The resolution variants of one video.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoSet {
    #[serde(default, deserialize_with = "non_empty_item")]
    pub large: Option<VideoItem>,
    pub medium: VideoItem,
    pub small: VideoItem,
    pub tiny: VideoItem,
}

/// One resolution variant of a video.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoItem {
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Size in bytes.
    pub size: u64,
}

fn split_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(RE_TAG_SEPARATOR.split(raw.trim()).map(str::to_string).collect())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number, got {other}"))),
    }
}

fn non_empty_item<'de, D>(deserializer: D) -> Result<Option<VideoItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let Some(raw) = raw.filter(|v| v.get("url").and_then(Value::as_str).is_some_and(|url| !url.is_empty())) else {
        return Ok(None);
    };
    VideoItem::deserialize(raw).map(Some).map_err(serde::de::Error::custom)
}
