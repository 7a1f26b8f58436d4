//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the engine and fetcher
//! traits, so the whole pipeline can be exercised without ffmpeg or network
//! access.
//!
//! # Example
//!
//! ```rust,ignore
//! use shortify_core::testing::{fixtures, MockEngine, MockFetcher};
//!
//! let engine = MockEngine::new();
//! let fetcher = MockFetcher::new();
//! fetcher.set_status("https://host/gone.mp4", 404).await;
//!
//! let orchestrator = Orchestrator::new(engine.clone(), fetcher.clone(), config);
//! orchestrator.submit(fixtures::file_selection(45, 1920, 1080)).await?;
//! ```

mod mock_engine;
mod mock_fetcher;

pub use mock_engine::{MockEngine, RecordedInvocation};
pub use mock_fetcher::MockFetcher;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::orchestrator::OrchestratorConfig;
    use crate::source::{LocalFile, Selection};

    /// A synthetic source video. The bytes only describe the clip; the mock
    /// engine never decodes them.
    pub fn source_video(name: &str, duration_secs: u32, width: u32, height: u32) -> LocalFile {
        let header = format!(
            "SHORTIFY-FIXTURE {}x{} {}s h264/aac\n",
            width, height, duration_secs
        );
        let mut bytes = header.into_bytes();
        bytes.resize(bytes.len() + 4096, 0);
        LocalFile::new(name, "video/mp4", bytes)
    }

    /// A selection holding only a synthetic source video.
    pub fn file_selection(duration_secs: u32, width: u32, height: u32) -> Selection {
        Selection::from_file(source_video("source.mp4", duration_secs, width, height))
    }

    /// Orchestrator config with a short settle delay for fast tests.
    pub fn fast_orchestrator_config() -> OrchestratorConfig {
        OrchestratorConfig {
            settle_delay_ms: 20,
            ..Default::default()
        }
    }
}
