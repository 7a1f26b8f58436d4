use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - ffmpeg path is not empty
/// - engine and fetch timeouts are not 0
/// - progress buffer is not 0
/// - download limit, when set, is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.engine.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if config.engine.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "engine.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.source.fetch_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "source.fetch_timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.source.max_download_bytes == Some(0) {
        return Err(ConfigError::ValidationError(
            "source.max_download_bytes cannot be 0".to_string(),
        ));
    }

    if config.orchestrator.progress_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.progress_buffer cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_empty_ffmpeg_path_fails() {
        let mut config = Config::default();
        config.engine.ffmpeg_path = PathBuf::new();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.engine.timeout_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.source.fetch_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_limits_fail() {
        let mut config = Config::default();
        config.source.max_download_bytes = Some(0);
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.orchestrator.progress_buffer = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_settle_delay_is_allowed() {
        let mut config = Config::default();
        config.orchestrator.settle_delay_ms = 0;
        assert!(validate_config(&config).is_ok());
    }
}
