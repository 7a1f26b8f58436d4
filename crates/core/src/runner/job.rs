//! Job runner implementation.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::engine::{ConversionError, EngineError, ProgressSender, TranscodeEngine};
use crate::metrics;
use crate::source::MediaInput;

use super::error::RunError;
use super::types::{ConversionOutput, ConversionRequest, INPUT_NAME, OUTPUT_NAME};

/// Runs the fixed conversion against a shared engine.
pub struct JobRunner<E: TranscodeEngine> {
    engine: Arc<E>,
    request: ConversionRequest,
}

impl<E: TranscodeEngine> JobRunner<E> {
    /// Creates a runner applying the standard short-clip request.
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            request: ConversionRequest::standard(),
        }
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    pub fn request(&self) -> &ConversionRequest {
        &self.request
    }

    /// Brings the engine up unless it already is.
    pub async fn ensure_engine(&self) -> Result<(), EngineError> {
        if self.engine.is_ready() {
            return Ok(());
        }

        info!(engine = self.engine.name(), "Loading transcoding engine");
        self.engine.initialize().await?;
        metrics::ENGINE_INITIALIZATIONS.inc();
        info!(engine = self.engine.name(), "Transcoding engine ready");
        Ok(())
    }

    /// Converts `input` and returns the produced bytes.
    ///
    /// `progress` receives samples only while this call runs. The input is
    /// consumed and both working-storage entries are freed before returning,
    /// whether the conversion succeeded or not.
    pub async fn run_conversion(
        &self,
        input: MediaInput,
        progress: ProgressSender,
    ) -> Result<ConversionOutput, RunError> {
        let start = Instant::now();
        self.ensure_engine().await?;

        debug!(
            name = %input.name(),
            content_type = %input.content_type(),
            bytes = input.len(),
            "Starting conversion"
        );

        let result = self.convert_staged(&input, progress).await;
        drop(input);
        self.release_storage().await;

        let bytes = result?;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(bytes = bytes.len(), elapsed_ms, "Conversion finished");

        Ok(ConversionOutput { bytes, elapsed_ms })
    }

    async fn convert_staged(
        &self,
        input: &MediaInput,
        progress: ProgressSender,
    ) -> Result<Vec<u8>, ConversionError> {
        self.engine.stage_input(INPUT_NAME, input.bytes()).await?;

        let argv = self.request.to_args(INPUT_NAME, OUTPUT_NAME);
        self.engine.invoke(&argv, progress).await?;

        self.engine.retrieve_output(OUTPUT_NAME).await
    }

    async fn release_storage(&self) {
        for name in [INPUT_NAME, OUTPUT_NAME] {
            if let Err(e) = self.engine.remove(name).await {
                warn!(name, error = %e, "Failed to free working storage entry");
            }
        }
    }
}
