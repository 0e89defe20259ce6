//! Pixabay client error types
//!
//! Every failure the client can raise, from parameter validation to
//! response classification, is a distinct variant of [`PixabayError`].

use thiserror::Error;

/// Maximum response body size accepted from the API or a download (16 MB).
pub const MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum PixabayError {
    /// A key that is not a canonical query parameter reached the registry.
    #[error("Parameter '{0}' is not supported by the Pixabay API")]
    UnsupportedParameter(String),

    /// A parameter value failed its type, range or enumeration check.
    #[error("Invalid value set for parameter {param}: {value}. {expected}")]
    InvalidValue {
        param: String,
        value: String,
        expected: String,
    },

    /// A key in a loosely-typed input mapping did not resolve to any field.
    #[error("{variant} does not support parameter: '{key}'")]
    UnsupportedLocalParameter { variant: &'static str, key: String },

    #[error("Too many requests{}", reset_suffix(.reset_seconds))]
    RateLimited { reset_seconds: Option<u64> },

    /// Best-effort: detected by the upstream error body mentioning "API key".
    #[error("The supplied API key '{0}' has been declined")]
    InvalidApiKey(String),

    #[error("Upstream error (HTTP {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Response too large ({size} bytes, max {MAX_RESPONSE_SIZE})")]
    ResponseTooLarge { size: u64 },

    #[error("Unable to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn reset_suffix(reset_seconds: &Option<u64>) -> String {
    reset_seconds.map_or_else(String::new, |s| format!(", limit resets in {s}s"))
}

impl PixabayError {
    pub(crate) fn invalid_value(
        param: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            param: param.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

/// Read a response body with size limit.
///
/// Checks `Content-Length` hint first (if available), then enforces the
/// limit on the actual body bytes.
pub async fn bytes_with_limit(
    response: reqwest::Response,
) -> Result<bytes::Bytes, PixabayError> {
    if let Some(cl) = response.content_length() {
        if cl as usize > MAX_RESPONSE_SIZE {
            return Err(PixabayError::ResponseTooLarge { size: cl });
        }
    }
    let bytes = response.bytes().await?;
    if bytes.len() > MAX_RESPONSE_SIZE {
        return Err(PixabayError::ResponseTooLarge { size: bytes.len() as u64 });
    }
    Ok(bytes)
}

impl From<reqwest::Error> for PixabayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for PixabayError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unsupported_parameter() {
        let err = PixabayError::UnsupportedParameter("type".to_string());
        assert_eq!(err.to_string(), "Parameter 'type' is not supported by the Pixabay API");
    }

    #[test]
    fn test_error_display_invalid_value() {
        let err = PixabayError::invalid_value("per_page", "101", "Must be an integer between 3 and 100 (inclusive)");
        assert_eq!(
            err.to_string(),
            "Invalid value set for parameter per_page: 101. Must be an integer between 3 and 100 (inclusive)"
        );
    }

    #[test]
    fn test_error_display_unsupported_local_parameter() {
        let err = PixabayError::UnsupportedLocalParameter {
            variant: "VideoSearchParams",
            key: "bogus".to_string(),
        };
        assert_eq!(err.to_string(), "VideoSearchParams does not support parameter: 'bogus'");
    }

    #[test]
    fn test_error_display_rate_limited() {
        let err = PixabayError::RateLimited { reset_seconds: None };
        assert_eq!(err.to_string(), "Too many requests");

        let err = PixabayError::RateLimited { reset_seconds: Some(42) };
        assert_eq!(err.to_string(), "Too many requests, limit resets in 42s");
    }

    #[test]
    fn test_error_display_invalid_api_key() {
        let err = PixabayError::InvalidApiKey("abc".to_string());
        assert_eq!(err.to_string(), "The supplied API key 'abc' has been declined");
    }

    #[test]
    fn test_error_display_upstream() {
        let err = PixabayError::Upstream {
            status: 500,
            body: "[ERROR 500] Internal".to_string(),
        };
        assert_eq!(err.to_string(), "Upstream error (HTTP 500): [ERROR 500] Internal");
    }

    #[test]
    fn test_error_display_response_too_large() {
        let err = PixabayError::ResponseTooLarge { size: 20_000_000 };
        let msg = err.to_string();
        assert!(msg.contains("20000000"));
        assert!(msg.contains(&MAX_RESPONSE_SIZE.to_string()));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: PixabayError = json_err.into();
        assert!(matches!(err, PixabayError::MalformedResponse(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PixabayError = io_err.into();
        assert!(matches!(err, PixabayError::Io(_)));
    }
}
