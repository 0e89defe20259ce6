// Pixabay Client
//
// Typed client for the Pixabay image and video search API.
//
// Architecture:
// - enums / params: fixed token sets and the registry that validates every outbound parameter
// - search: per-resource search builders rendered through the registry
// - client: shared request pipeline, parameterized by an Endpoint (images, videos)
// - transport: the single GET the client delegates to (reqwest in production)
// - page / headers: typed result pages built from the JSON body and response headers
// - download: fetch hit URLs into memory or onto disk

// Shared error types
pub mod error;

// Configuration
pub mod config;

// Parameters and search builders
pub mod enums;
pub mod params;
pub mod search;

// Request pipeline
pub mod client;
pub mod transport;

// Results
pub mod headers;
pub mod page;

// Utilities
pub mod download;

// Re-export common types for convenience
pub use client::{classify, Api, Endpoint, ImageApi, Images, VideoApi, Videos};
pub use config::{ClientConfig, Config, LoggingConfig};
pub use download::{file_name_from_url, Downloader};
pub use enums::{Category, Color, ImageType, Language, Order, Orientation, Param, VideoPreviewSize, VideoType};
pub use error::PixabayError;
pub use page::{Image, ImagePage, Page, RateLimit, Video, VideoItem, VideoPage};
pub use params::{ParamValue, QueryMap};
pub use search::{ImageFilters, ImageSearchParams, SearchParams, SearchVariant, VideoFilters, VideoSearchParams};
pub use transport::{RawResponse, ReqwestTransport, Transport};
