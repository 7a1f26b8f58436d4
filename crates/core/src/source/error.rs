//! Error types for source resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that keep a selection from becoming media input.
#[derive(Debug, Error)]
pub enum InputError {
    /// Neither a file nor a link was provided.
    #[error("No input provided: select a file or paste a link")]
    NoInput,

    /// The link is not an absolute http(s) URL.
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("Fetching {url} failed with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The request never produced a response.
    #[error("Network error fetching {url}: {reason}")]
    Network { url: String, reason: String },

    /// The response body could not be read.
    #[error("Malformed response body from {url}: {reason}")]
    Body { url: String, reason: String },

    /// The body exceeds the configured download limit.
    #[error("Download exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    /// A local file could not be read.
    #[error("Failed to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InputError {
    /// Creates a new invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new network error.
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new body error.
    pub fn body(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Body {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure came from fetching a link.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::HttpStatus { .. } | Self::Network { .. } | Self::Body { .. } | Self::TooLarge { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InputError::HttpStatus {
            url: "https://host/clip".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "Fetching https://host/clip failed with HTTP 404");
        assert!(err.is_fetch_failure());
        assert!(!InputError::NoInput.is_fetch_failure());
    }
}
