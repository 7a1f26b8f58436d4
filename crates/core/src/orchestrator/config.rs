//! Orchestrator configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the job orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// How long Done/Failed stays visible before returning to Idle (milliseconds).
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Capacity of the per-job progress channel.
    /// The engine waits when the channel is full, so samples are never dropped.
    #[serde(default = "default_progress_buffer")]
    pub progress_buffer: usize,
}

fn default_settle_delay() -> u64 {
    1000 // 1 second
}

fn default_progress_buffer() -> usize {
    64
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay(),
            progress_buffer: default_progress_buffer(),
        }
    }
}

impl OrchestratorConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
