use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;
use crate::orchestrator::OrchestratorConfig;
use crate::source::SourceConfig;

/// Root configuration
///
/// Every section is optional; a missing file section falls back to its defaults.
/// The conversion parameters themselves are not part of the configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.engine.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.orchestrator.settle_delay_ms, 1000);
        assert_eq!(config.source.max_download_bytes, None);
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let toml = r#"
[engine]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"

[source]
max_download_bytes = 104857600
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.engine.ffmpeg_path,
            PathBuf::from("/opt/ffmpeg/bin/ffmpeg")
        );
        assert_eq!(config.engine.timeout_secs, 600);
        assert_eq!(config.source.max_download_bytes, Some(104_857_600));
        assert_eq!(config.source.fetch_timeout_secs, 60);
    }

    #[test]
    fn test_unknown_conversion_section_is_ignored() {
        // The conversion request is fixed; a stray section must not change it.
        let toml = r#"
[conversion]
preset = "slow"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.orchestrator.progress_buffer, 64);
    }

    #[test]
    fn test_roundtrip_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.engine.ffmpeg_log_level, config.engine.ffmpeg_log_level);
    }
}
