//! Trait definitions for the engine module.

use async_trait::async_trait;

use super::error::{ConversionError, EngineError};
use super::types::ProgressSender;

/// A transcoding engine driven by command-style argument lists.
///
/// One instance is shared by every job in the process. Callers are expected
/// to run at most one job against it at a time.
#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Whether `initialize` has completed successfully.
    fn is_ready(&self) -> bool;

    /// Brings the engine up. Calling it again once ready is a no-op.
    async fn initialize(&self) -> Result<(), EngineError>;

    /// Writes a buffer into working storage under a logical name.
    async fn stage_input(&self, name: &str, bytes: &[u8]) -> Result<(), ConversionError>;

    /// Runs the engine with the given arguments.
    ///
    /// Progress is reported into `progress` until this call returns. The
    /// sender is dropped on return, so later invocations never reach it.
    async fn invoke(
        &self,
        argv: &[String],
        progress: ProgressSender,
    ) -> Result<(), ConversionError>;

    /// Reads a buffer out of working storage.
    async fn retrieve_output(&self, name: &str) -> Result<Vec<u8>, ConversionError>;

    /// Frees a working-storage entry. Removing a missing entry succeeds.
    async fn remove(&self, name: &str) -> Result<(), ConversionError>;
}
