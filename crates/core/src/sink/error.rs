//! Error types for the result sink.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while publishing or serving a result.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The engine produced no bytes.
    #[error("Conversion produced an empty output")]
    EmptyOutput,

    /// The handle was revoked or never issued.
    #[error("Display handle {locator} has been revoked")]
    Revoked { locator: String },

    /// Writing the downloaded result failed.
    #[error("Failed to save result to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SinkError {
    /// Creates a new revoked-handle error.
    pub fn revoked(locator: impl Into<String>) -> Self {
        Self::Revoked {
            locator: locator.into(),
        }
    }
}
