use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::PixabayError;

/// Default API root. Image searches go here, video searches to `videos/`.
pub const DEFAULT_BASE_URL: &str = "https://pixabay.com/api/";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
            user_agent: concat!("pixabay-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// Keeps the credential out of debug output and logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Check the settings and return the parsed base URL.
    ///
    /// The URL always ends with `/` so that endpoint paths join under it.
    pub fn validate(&self) -> Result<Url, PixabayError> {
        if self.timeout_seconds == 0 {
            return Err(PixabayError::InvalidConfig("timeout_seconds must be positive".to_string()));
        }
        if self.connect_timeout_seconds == 0 {
            return Err(PixabayError::InvalidConfig(
                "connect_timeout_seconds must be positive".to_string(),
            ));
        }
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PixabayError::InvalidConfig(format!("invalid base_url '{}': {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PixabayError::InvalidConfig(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (`PIXABAY_CLIENT__API_KEY`, `PIXABAY_LOGGING__LEVEL`, ...)
    /// 2. Config file (if provided and present)
    /// 3. Default values
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("PIXABAY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load configuration from environment only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load configuration from file, with environment overrides
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }
}
