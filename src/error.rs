use std::time::Duration;
use thiserror::Error;

/// Errors produced by the recognizer and its collaborators.
///
/// Reply interpretation never fails; these cover image intake, configuration
/// and the model call.
#[derive(Error, Debug)]
pub enum RecognizeError {
    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed at the serde level.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the image from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error with status code, response body, and optional Retry-After hint.
    ///
    /// Returned by [`Backend`](crate::backend::Backend) implementations when
    /// the model endpoint returns a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 429, 500, 503).
        status: u16,
        /// Response body text.
        body: String,
        /// Parsed `Retry-After` header value, if present.
        retry_after: Option<Duration>,
    },

    /// The image file extension is not one of the accepted formats.
    #[error("unsupported image format: {extension:?}")]
    UnsupportedImage { extension: Option<String> },

    /// The image exceeds the configured size limit.
    #[error("image is {size} bytes, limit is {limit}")]
    ImageTooLarge { size: u64, limit: u64 },

    /// Invalid configuration detected while loading or building.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for RecognizeError {
    fn from(err: anyhow::Error) -> Self {
        RecognizeError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RecognizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = RecognizeError::HttpError {
            status: 503,
            body: "busy".into(),
            retry_after: None,
        };
        assert_eq!(err.to_string(), "HTTP 503: busy");
    }

    #[test]
    fn test_from_anyhow() {
        let err: RecognizeError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, RecognizeError::Other(ref m) if m == "boom"));
    }
}
