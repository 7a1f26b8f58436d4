//! Mock transcoding engine for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::engine::{
    validate_logical_name, ConversionError, EngineError, ProgressSample, ProgressSender,
    TranscodeEngine,
};

/// A recorded engine invocation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedInvocation {
    /// Arguments the engine was invoked with.
    pub argv: Vec<String>,
    /// Bytes staged under the `-i` name at invocation time.
    pub staged_input: Vec<u8>,
    /// Whether the invocation succeeded.
    pub success: bool,
}

/// Mock implementation of the TranscodeEngine trait.
///
/// Clones share state, so a test can keep one clone for assertions and hand
/// another to the code under test. Provides controllable behavior:
/// - Track initializations and invocations
/// - Simulate init and invocation failures
/// - Control the produced output and the emitted progress ratios
/// - Simulate invocation time
///
/// # Example
///
/// ```rust,ignore
/// use shortify_core::testing::MockEngine;
///
/// let engine = MockEngine::new();
/// engine.set_output(b"clip".to_vec()).await;
/// engine.set_progress_ratios(vec![0.5, 1.0]).await;
///
/// let runner = JobRunner::new(Arc::new(engine.clone()));
/// runner.run_conversion(input, progress_tx).await?;
///
/// assert_eq!(engine.init_count(), 1);
/// assert!(engine.stored_names().await.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct MockEngine {
    ready: Arc<AtomicBool>,
    /// Initializations that did real work.
    init_count: Arc<AtomicUsize>,
    /// If set, the next initialization fails with this error.
    init_error: Arc<RwLock<Option<EngineError>>>,
    /// Working storage by logical name.
    storage: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    invocations: Arc<RwLock<Vec<RecordedInvocation>>>,
    /// If set, the next invocation fails with this error.
    invoke_error: Arc<RwLock<Option<ConversionError>>>,
    /// Bytes written to the output name on success.
    output: Arc<RwLock<Vec<u8>>>,
    /// Ratios reported during each invocation.
    progress_ratios: Arc<RwLock<Vec<f64>>>,
    /// Simulated invocation duration in milliseconds.
    invoke_duration_ms: Arc<RwLock<u64>>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// Create a new mock engine.
    pub fn new() -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(false)),
            init_count: Arc::new(AtomicUsize::new(0)),
            init_error: Arc::new(RwLock::new(None)),
            storage: Arc::new(RwLock::new(HashMap::new())),
            invocations: Arc::new(RwLock::new(Vec::new())),
            invoke_error: Arc::new(RwLock::new(None)),
            output: Arc::new(RwLock::new(b"mock-mp4-output".to_vec())),
            progress_ratios: Arc::new(RwLock::new(vec![0.0, 0.25, 0.5, 0.75, 1.0])),
            invoke_duration_ms: Arc::new(RwLock::new(10)),
        }
    }

    /// Number of initializations that brought the engine up.
    pub fn init_count(&self) -> usize {
        self.init_count.load(Ordering::SeqCst)
    }

    /// Get all recorded invocations.
    pub async fn recorded_invocations(&self) -> Vec<RecordedInvocation> {
        self.invocations.read().await.clone()
    }

    /// Names currently held in working storage, sorted.
    pub async fn stored_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.storage.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Configure the next initialization to fail with the given error.
    pub async fn set_init_error(&self, error: EngineError) {
        *self.init_error.write().await = Some(error);
    }

    /// Configure the next invocation to fail with the given error.
    pub async fn set_invoke_error(&self, error: ConversionError) {
        *self.invoke_error.write().await = Some(error);
    }

    /// Set the bytes produced by successful invocations.
    pub async fn set_output(&self, bytes: Vec<u8>) {
        *self.output.write().await = bytes;
    }

    /// Set the ratios reported during each invocation, in order.
    pub async fn set_progress_ratios(&self, ratios: Vec<f64>) {
        *self.progress_ratios.write().await = ratios;
    }

    /// Set the simulated invocation duration.
    pub async fn set_invoke_duration(&self, duration: Duration) {
        *self.invoke_duration_ms.write().await = duration.as_millis() as u64;
    }

    fn input_name(argv: &[String]) -> Option<&str> {
        argv.iter()
            .position(|arg| arg == "-i")
            .and_then(|i| argv.get(i + 1))
            .map(String::as_str)
    }
}

#[async_trait]
impl TranscodeEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn initialize(&self) -> Result<(), EngineError> {
        if self.is_ready() {
            return Ok(());
        }
        if let Some(err) = self.init_error.write().await.take() {
            return Err(err);
        }

        self.init_count.fetch_add(1, Ordering::SeqCst);
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stage_input(&self, name: &str, bytes: &[u8]) -> Result<(), ConversionError> {
        if !self.is_ready() {
            return Err(ConversionError::NotReady);
        }
        validate_logical_name(name)?;

        self.storage
            .write()
            .await
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn invoke(
        &self,
        argv: &[String],
        progress: ProgressSender,
    ) -> Result<(), ConversionError> {
        if !self.is_ready() {
            return Err(ConversionError::NotReady);
        }

        let input_name = Self::input_name(argv)
            .ok_or_else(|| ConversionError::failed("no input given", None))?;
        let output_name = argv
            .last()
            .cloned()
            .ok_or_else(|| ConversionError::failed("no output given", None))?;

        let staged_input = self
            .storage
            .read()
            .await
            .get(input_name)
            .cloned()
            .ok_or_else(|| ConversionError::MissingEntry {
                name: input_name.to_string(),
            })?;

        let ratios = self.progress_ratios.read().await.clone();
        let duration_ms = *self.invoke_duration_ms.read().await;
        let step = Duration::from_millis(duration_ms / ratios.len().max(1) as u64);

        for ratio in ratios {
            let _ = progress.send(ProgressSample::new(ratio)).await;
            if !step.is_zero() {
                tokio::time::sleep(step).await;
            }
        }

        if let Some(err) = self.invoke_error.write().await.take() {
            // A failed run can still leave a partial output behind
            self.storage
                .write()
                .await
                .insert(output_name, b"partial".to_vec());
            self.invocations.write().await.push(RecordedInvocation {
                argv: argv.to_vec(),
                staged_input,
                success: false,
            });
            return Err(err);
        }

        let output = self.output.read().await.clone();
        self.storage.write().await.insert(output_name, output);
        self.invocations.write().await.push(RecordedInvocation {
            argv: argv.to_vec(),
            staged_input,
            success: true,
        });
        Ok(())
    }

    async fn retrieve_output(&self, name: &str) -> Result<Vec<u8>, ConversionError> {
        if !self.is_ready() {
            return Err(ConversionError::NotReady);
        }

        self.storage
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| ConversionError::MissingEntry {
                name: name.to_string(),
            })
    }

    async fn remove(&self, name: &str) -> Result<(), ConversionError> {
        validate_logical_name(name)?;
        self.storage.write().await.remove(name);
        Ok(())
    }
}
