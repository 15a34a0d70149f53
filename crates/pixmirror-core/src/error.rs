//! Error types for the pixmirror pipeline.
//!
//! Errors are organized by the recovery policy they carry: fetch and
//! transcode failures are recorded or logged and the run continues, while
//! config and persistence errors propagate and abort.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for pixmirror operations.
///
/// Everything that reaches this type is fatal for the run; per-URL
/// failures stay inside [`FetchError`] / [`TranscodeError`] and are
/// accounted for in the inventory instead.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The site root could not be interpreted as a URL
    #[error("Invalid site URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// General I/O errors (directory creation, inventory writes)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors while persisting the inventory
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Classified outcome of a failed HTTP fetch.
///
/// The `Display` text of a variant is what ends up in a
/// [`FailureRecord`](crate::types::FailureRecord), so a non-success
/// status renders as `HTTP <code>`.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("HTTP {status}")]
    Status { url: String, status: u16 },

    /// The request exceeded its timeout
    #[error("request timed out")]
    Timeout { url: String },

    /// TCP/TLS connection could not be established
    #[error("connection failed: {message}")]
    Connect { url: String, message: String },

    /// The hostname did not resolve
    #[error("could not resolve hostname")]
    Dns { url: String },

    /// Any other request-level failure
    #[error("request failed: {message}")]
    Request { url: String, message: String },
}

impl FetchError {
    /// The URL the failed request was addressed to.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Timeout { url }
            | FetchError::Connect { url, .. }
            | FetchError::Dns { url }
            | FetchError::Request { url, .. } => url,
        }
    }
}

/// Transcoding errors, warned about and then ignored by the orchestrator.
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// The downloaded bytes did not decode as an image
    #[error("decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Re-encoding the normalized image failed
    #[error("encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Reading or rewriting the file failed
    #[error("io error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for pixmirror results.
pub type Result<T> = std::result::Result<T, MirrorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_failure_renders_http_code() {
        let err = FetchError::Status {
            url: "https://site.example/a.png".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "HTTP 404");
    }

    #[test]
    fn test_fetch_error_exposes_url() {
        let err = FetchError::Timeout {
            url: "https://site.example/slow.jpg".to_string(),
        };
        assert_eq!(err.url(), "https://site.example/slow.jpg");
    }
}
