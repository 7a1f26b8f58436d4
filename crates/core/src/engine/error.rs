//! Error types for the engine module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that keep the engine from becoming ready.
#[derive(Debug, Error)]
pub enum EngineError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// FFmpeg exists but did not answer a version probe.
    #[error("FFmpeg is not usable: {reason}")]
    Unusable { reason: String },

    /// Working storage could not be created.
    #[error("Failed to create working storage at {path}: {source}")]
    WorkDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    /// Creates a new unusable-engine error.
    pub fn unusable(reason: impl Into<String>) -> Self {
        Self::Unusable {
            reason: reason.into(),
        }
    }
}

/// Errors raised while running a job on an initialized engine.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The engine was used before `initialize` succeeded.
    #[error("Engine is not initialized")]
    NotReady,

    /// Engine invocation failed.
    #[error("Conversion failed: {reason}")]
    Failed {
        reason: String,
        stderr: Option<String>,
    },

    /// Engine invocation timed out.
    #[error("Conversion timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Requested working-storage entry does not exist.
    #[error("Working storage has no entry named {name}")]
    MissingEntry { name: String },

    /// Logical name would escape the flat working storage.
    #[error("Invalid working storage name: {name:?}")]
    InvalidName { name: String },

    /// I/O error during conversion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    /// Creates a new conversion failed error with stderr output.
    pub fn failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Captured engine diagnostics, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}
