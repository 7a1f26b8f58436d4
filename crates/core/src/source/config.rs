//! Configuration for source resolution.

use serde::{Deserialize, Serialize};

/// Configuration for fetching media from links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// User agent sent with fetch requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Largest body accepted from a link, in bytes. Unlimited when unset.
    #[serde(default)]
    pub max_download_bytes: Option<u64>,
}

fn default_fetch_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("shortify/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
            max_download_bytes: None,
        }
    }
}
