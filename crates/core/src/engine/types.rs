//! Types shared across engine implementations.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::error::ConversionError;

/// A fractional progress report emitted by the engine.
///
/// The ratio is whatever the engine computed; it is not guaranteed to lie in
/// `[0, 1]` nor to increase between samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressSample {
    /// Completed fraction of the job as reported by the engine.
    pub ratio: f64,
}

impl ProgressSample {
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }
}

/// Channel end the engine reports progress into for the duration of one invocation.
pub type ProgressSender = mpsc::Sender<ProgressSample>;

/// Checks that a logical name addresses a single flat working-storage entry.
pub fn validate_logical_name(name: &str) -> Result<(), ConversionError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if invalid {
        return Err(ConversionError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}
