//! Error type for the job runner.

use thiserror::Error;

use crate::engine::{ConversionError, EngineError};

/// Why a conversion run failed.
#[derive(Debug, Error)]
pub enum RunError {
    /// The engine could not be brought up.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// The engine was up but the job failed.
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),
}
