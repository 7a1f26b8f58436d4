pub mod config;
pub mod engine;
pub mod metrics;
pub mod orchestrator;
pub mod progress;
pub mod runner;
pub mod sink;
pub mod source;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError,
};
pub use engine::{FfmpegEngine, TranscodeEngine};
pub use orchestrator::{JobEvent, JobState, Orchestrator, OrchestratorConfig, OrchestratorError};
pub use sink::{DisplayHandle, ResultSink};
pub use source::{HttpFetcher, LocalFile, MediaFetcher, Selection};
