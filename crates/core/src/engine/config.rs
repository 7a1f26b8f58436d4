//! Configuration for the engine module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the FFmpeg-based engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Directory backing the engine's working storage.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// FFmpeg log level. Levels below `info` hide the input duration, so
    /// progress falls back to the trim length.
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Timeout for a single invocation in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("shortify-engine")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    600 // 10 minutes
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            work_dir: default_work_dir(),
            ffmpeg_log_level: default_log_level(),
            timeout_secs: default_timeout(),
        }
    }
}

impl EngineConfig {
    /// Creates a new config with a custom ffmpeg path.
    pub fn with_ffmpeg_path(ffmpeg_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ..Default::default()
        }
    }

    /// Sets the working storage directory.
    pub fn with_work_dir(mut self, work_dir: PathBuf) -> Self {
        self.work_dir = work_dir;
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
