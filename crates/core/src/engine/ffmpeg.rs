//! FFmpeg-backed engine implementation.
//!
//! Working storage is a directory; logical names are file names inside it and
//! ffmpeg runs with that directory as its current directory, so an argument
//! list can refer to `input.mp4` and `output.mp4` directly.

use async_trait::async_trait;
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::OnceCell;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::config::EngineConfig;
use super::error::{ConversionError, EngineError};
use super::traits::TranscodeEngine;
use super::types::{validate_logical_name, ProgressSample, ProgressSender};

/// Upper bound on captured diagnostic output kept for error reports.
const MAX_ERROR_OUTPUT: usize = 16 * 1024;

/// FFmpeg-backed engine implementation.
pub struct FfmpegEngine {
    config: EngineConfig,
    ready: OnceCell<()>,
}

impl FfmpegEngine {
    /// Creates a new FFmpeg engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ready: OnceCell::new(),
        }
    }

    /// Creates an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Directory backing working storage.
    pub fn work_dir(&self) -> &Path {
        &self.config.work_dir
    }

    fn storage_path(&self, name: &str) -> Result<PathBuf, ConversionError> {
        validate_logical_name(name)?;
        Ok(self.config.work_dir.join(name))
    }

    /// Builds the full ffmpeg argument list around a job's argv.
    fn build_args(&self, argv: &[String]) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-nostdin".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            // Machine-readable progress interleaved with the log
            "-progress".to_string(),
            "pipe:2".to_string(),
        ];
        args.extend(argv.iter().cloned());
        args
    }

    async fn check_ffmpeg(&self) -> Result<(), EngineError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EngineError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    EngineError::unusable(e.to_string())
                }
            })?;

        if !output.status.success() {
            return Err(EngineError::unusable(format!(
                "`{} -version` exited with code {:?}",
                self.config.ffmpeg_path.display(),
                output.status.code()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Some(first_line) = stdout.lines().next() {
            debug!(version = first_line, "FFmpeg version probe");
        }
        Ok(())
    }

    async fn bring_up(&self) -> Result<(), EngineError> {
        self.check_ffmpeg().await?;

        tokio::fs::create_dir_all(&self.config.work_dir)
            .await
            .map_err(|source| EngineError::WorkDirFailed {
                path: self.config.work_dir.clone(),
                source,
            })?;

        info!(
            ffmpeg = %self.config.ffmpeg_path.display(),
            work_dir = %self.config.work_dir.display(),
            "FFmpeg engine initialized"
        );
        Ok(())
    }
}

#[async_trait]
impl TranscodeEngine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    async fn initialize(&self) -> Result<(), EngineError> {
        self.ready.get_or_try_init(|| self.bring_up()).await?;
        Ok(())
    }

    async fn stage_input(&self, name: &str, bytes: &[u8]) -> Result<(), ConversionError> {
        if !self.is_ready() {
            return Err(ConversionError::NotReady);
        }
        let path = self.storage_path(name)?;
        tokio::fs::write(&path, bytes).await?;
        debug!(name, bytes = bytes.len(), "Staged input");
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

        let start = Instant::now();
        let args = self.build_args(argv);
        debug!(args = ?args, "Invoking ffmpeg");

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .current_dir(&self.config.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ConversionError::failed("FFmpeg stderr was not captured", None))?;
        // Container metadata is echoed verbatim and may not be UTF-8
        let mut reader = BufReader::new(stderr).split(b'\n');
        let mut parser = ProgressParser::new(trim_from_args(argv));

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            let mut error_output = String::new();

            while let Some(raw) = reader.next_segment().await? {
                let line = String::from_utf8_lossy(&raw);
                if (line.contains("Error") || line.contains("error") || line.contains("Invalid"))
                    && error_output.len() < MAX_ERROR_OUTPUT
                {
                    error_output.push_str(line.trim_end());
                    error_output.push('\n');
                }

                if let Some(ratio) = parser.feed(&line) {
                    // A closed receiver only means nobody is watching
                    let _ = progress.send(ProgressSample::new(ratio)).await;
                }
            }

            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, error_output))
        })
        .await;

        match result {
            Ok(Ok((status, error_output))) => {
                if !status.success() {
                    warn!(code = ?status.code(), "FFmpeg exited with failure");
                    return Err(ConversionError::failed(
                        format!("FFmpeg exited with code: {:?}", status.code()),
                        if error_output.is_empty() {
                            None
                        } else {
                            Some(error_output)
                        },
                    ));
                }
            }
            Ok(Err(e)) => return Err(ConversionError::Io(e)),
            Err(_) => {
                let _ = child.kill().await;
                return Err(ConversionError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        }

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "FFmpeg invocation finished"
        );
        Ok(())
    }

    async fn retrieve_output(&self, name: &str) -> Result<Vec<u8>, ConversionError> {
        let path = self.storage_path(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ConversionError::MissingEntry {
                    name: name.to_string(),
                })
            }
            Err(e) => Err(ConversionError::Io(e)),
        }
    }

    async fn remove(&self, name: &str) -> Result<(), ConversionError> {
        let path = self.storage_path(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ConversionError::Io(e)),
        }
    }
}

/// Turns ffmpeg's log and `-progress` output into completion ratios.
struct ProgressParser {
    duration_re: Option<Regex>,
    time_re: Option<Regex>,
    input_duration: Option<f64>,
    trim: Option<f64>,
    last_ratio: Option<f64>,
}

impl ProgressParser {
    fn new(trim: Option<f64>) -> Self {
        Self {
            duration_re: Regex::new(r"Duration:\s*(\d+:\d{2}:\d{2}(?:\.\d+)?)").ok(),
            time_re: Regex::new(r"^out_time_(?:us|ms)=(\d+)").ok(),
            input_duration: None,
            trim,
            last_ratio: None,
        }
    }

    /// Length of the output in seconds, as far as it is known.
    fn total_secs(&self) -> Option<f64> {
        match (self.input_duration, self.trim) {
            (Some(d), Some(t)) => Some(d.min(t)),
            (Some(d), None) => Some(d),
            (None, Some(t)) => Some(t),
            (None, None) => None,
        }
    }

    /// Feeds one stderr line; returns a ratio when the line moved progress.
    fn feed(&mut self, line: &str) -> Option<f64> {
        let line = line.trim();

        if self.input_duration.is_none() {
            if let Some(ref re) = self.duration_re {
                if let Some(caps) = re.captures(line) {
                    self.input_duration = caps.get(1).and_then(|m| parse_timestamp(m.as_str()));
                    return None;
                }
            }
        }

        let ratio = if line == "progress=end" {
            Some(1.0)
        } else {
            let micros = self
                .time_re
                .as_ref()
                .and_then(|re| re.captures(line))
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())?;
            // out_time_ms is in microseconds as well
            let secs = micros / 1_000_000.0;
            match self.total_secs() {
                Some(total) if total > 0.0 => Some(secs / total),
                _ => None,
            }
        }?;

        if self.last_ratio == Some(ratio) {
            return None;
        }
        self.last_ratio = Some(ratio);
        Some(ratio)
    }
}

/// Parses `HH:MM:SS[.frac]`, `MM:SS` or plain seconds.
fn parse_timestamp(value: &str) -> Option<f64> {
    let mut total = 0.0;
    for part in value.trim().split(':') {
        let n = part.parse::<f64>().ok()?;
        if n < 0.0 {
            return None;
        }
        total = total * 60.0 + n;
    }
    Some(total)
}

/// Extracts the `-t` duration from an argument list.
fn trim_from_args(argv: &[String]) -> Option<f64> {
    argv.iter()
        .position(|a| a == "-t")
        .and_then(|i| argv.get(i + 1))
        .and_then(|v| parse_timestamp(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_args_wraps_job_argv() {
        let engine = FfmpegEngine::with_defaults();
        let built = engine.build_args(&args(&["-i", "input.mp4", "output.mp4"]));

        assert_eq!(built[0], "-y");
        assert!(built.contains(&"-progress".to_string()));
        assert!(built.contains(&"pipe:2".to_string()));
        assert!(built.contains(&"info".to_string()));
        assert_eq!(&built[built.len() - 3..], &args(&["-i", "input.mp4", "output.mp4"])[..]);
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("00:00:30"), Some(30.0));
        assert_eq!(parse_timestamp("01:02:03"), Some(3723.0));
        assert_eq!(parse_timestamp("02:30"), Some(150.0));
        assert_eq!(parse_timestamp("12.5"), Some(12.5));
        let secs = parse_timestamp("00:00:45.50").unwrap();
        assert!((secs - 45.5).abs() < 1e-9);
        assert_eq!(parse_timestamp("N/A"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_trim_from_args() {
        assert_eq!(
            trim_from_args(&args(&["-i", "in.mp4", "-t", "00:00:30", "out.mp4"])),
            Some(30.0)
        );
        assert_eq!(trim_from_args(&args(&["-i", "in.mp4", "out.mp4"])), None);
        assert_eq!(trim_from_args(&args(&["-i", "in.mp4", "-t"])), None);
    }

    #[test]
    fn test_progress_parser_uses_shorter_of_duration_and_trim() {
        let mut parser = ProgressParser::new(Some(30.0));

        assert_eq!(
            parser.feed("  Duration: 00:00:45.00, start: 0.000000, bitrate: 8000 kb/s"),
            None
        );
        assert_eq!(parser.feed("frame=100"), None);

        let ratio = parser.feed("out_time_us=15000000").unwrap();
        assert!((ratio - 0.5).abs() < 1e-9);

        // out_time_ms repeats the same position and is deduplicated
        assert_eq!(parser.feed("out_time_ms=15000000"), None);

        assert_eq!(parser.feed("progress=end"), Some(1.0));
    }

    #[test]
    fn test_progress_parser_short_input() {
        let mut parser = ProgressParser::new(Some(30.0));
        parser.feed("Duration: 00:00:10.00, start: 0.0");

        let ratio = parser.feed("out_time_us=5000000").unwrap();
        assert!((ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_progress_parser_without_any_duration() {
        let mut parser = ProgressParser::new(None);
        assert_eq!(parser.feed("out_time_us=5000000"), None);
        assert_eq!(parser.feed("progress=end"), Some(1.0));
    }

    #[test]
    fn test_progress_parser_only_first_duration_counts() {
        let mut parser = ProgressParser::new(None);
        parser.feed("Duration: 00:01:40.00, start: 0.0");
        // Output stream summary printed later must not replace the input length
        parser.feed("Duration: 00:00:30.00, start: 0.0");

        let ratio = parser.feed("out_time_us=50000000").unwrap();
        assert!((ratio - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_invoke_before_initialize_fails() {
        let engine = FfmpegEngine::with_defaults();
        let (tx, _rx) = mpsc::channel(4);

        let result = engine.invoke(&args(&["-version"]), tx).await;
        assert!(matches!(result, Err(ConversionError::NotReady)));
        assert!(matches!(
            engine.stage_input("input.mp4", b"data").await,
            Err(ConversionError::NotReady)
        ));
    }

    #[tokio::test]
    async fn test_initialize_missing_binary() {
        let temp = TempDir::new().unwrap();
        let config = EngineConfig::with_ffmpeg_path(PathBuf::from("/nonexistent/bin/ffmpeg"))
            .with_work_dir(temp.path().join("work"));
        let engine = FfmpegEngine::new(config);

        let result = engine.initialize().await;
        assert!(matches!(result, Err(EngineError::FfmpegNotFound { .. })));
        assert!(!engine.is_ready());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_initialize_rejects_failing_binary() {
        let temp = TempDir::new().unwrap();
        let config = EngineConfig::with_ffmpeg_path(PathBuf::from("false"))
            .with_work_dir(temp.path().join("work"));
        let engine = FfmpegEngine::new(config);

        let result = engine.initialize().await;
        assert!(matches!(result, Err(EngineError::Unusable { .. })));
        assert!(!engine.is_ready());
    }

    /// `true` stands in for a binary that accepts `-version` and produces nothing.
    #[cfg(unix)]
    fn stand_in_engine(temp: &TempDir) -> FfmpegEngine {
        let config = EngineConfig::with_ffmpeg_path(PathBuf::from("true"))
            .with_work_dir(temp.path().join("work"));
        FfmpegEngine::new(config)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let engine = stand_in_engine(&temp);

        engine.initialize().await.unwrap();
        assert!(engine.is_ready());
        engine.initialize().await.unwrap();
        assert!(engine.is_ready());
        assert!(engine.work_dir().is_dir());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_working_storage_roundtrip_and_remove() {
        let temp = TempDir::new().unwrap();
        let engine = stand_in_engine(&temp);
        engine.initialize().await.unwrap();

        engine.stage_input("input.mp4", b"frames").await.unwrap();
        assert_eq!(engine.retrieve_output("input.mp4").await.unwrap(), b"frames");

        engine.remove("input.mp4").await.unwrap();
        assert!(matches!(
            engine.retrieve_output("input.mp4").await,
            Err(ConversionError::MissingEntry { .. })
        ));
        // Removing twice is fine
        engine.remove("input.mp4").await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_invoke_without_output_leaves_no_entry() {
        let temp = TempDir::new().unwrap();
        let engine = stand_in_engine(&temp);
        engine.initialize().await.unwrap();

        let (tx, _rx) = mpsc::channel(4);
        engine
            .invoke(&args(&["-i", "input.mp4", "output.mp4"]), tx)
            .await
            .unwrap();

        assert!(matches!(
            engine.retrieve_output("output.mp4").await,
            Err(ConversionError::MissingEntry { .. })
        ));
    }

    /// Writes an executable shell script standing in for ffmpeg.
    #[cfg(unix)]
    fn script_engine(temp: &TempDir, body: &str) -> FfmpegEngine {
        use std::os::unix::fs::PermissionsExt;

        let script = temp.path().join("fake-ffmpeg.sh");
        std::fs::write(&script, format!("#!/bin/sh\n{}\nexit 0\n", body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = EngineConfig::with_ffmpeg_path(script)
            .with_work_dir(temp.path().join("work"))
            .with_timeout(30);
        FfmpegEngine::new(config)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_invoke_drains_non_utf8_stderr() {
        let temp = TempDir::new().unwrap();
        // A Latin-1 title followed by more output than a pipe buffer holds
        let engine = script_engine(
            &temp,
            r#"case "$1" in -version) exit 0 ;; esac
echo "  Duration: 00:00:30.00, start: 0.000000" >&2
printf '    title           : Caf\351\n' >&2
i=1
while [ $i -le 12000 ]; do
  echo "out_time_us=$((i * 2500))" >&2
  i=$((i + 1))
done
echo "progress=end" >&2"#,
        );
        engine.initialize().await.unwrap();

        let (tx, mut rx) = mpsc::channel::<ProgressSample>(16);
        let counter = tokio::spawn(async move {
            let mut samples = Vec::new();
            while let Some(sample) = rx.recv().await {
                samples.push(sample.ratio);
            }
            samples
        });

        let result = timeout(
            Duration::from_secs(20),
            engine.invoke(&args(&["-i", "input.mp4", "-t", "00:00:30", "output.mp4"]), tx),
        )
        .await
        .expect("invocation stalled on stderr");
        assert!(result.is_ok(), "unexpected result: {:?}", result);

        let samples = counter.await.unwrap();
        // progress=end repeats the final ratio and is deduplicated
        assert_eq!(samples.len(), 12000);
        assert_eq!(samples.last().copied(), Some(1.0));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_invoke_failure_keeps_non_utf8_error_lines() {
        let temp = TempDir::new().unwrap();
        let engine = script_engine(
            &temp,
            r#"case "$1" in -version) exit 0 ;; esac
printf 'input.mp4: Invalid data found in \377 stream\n' >&2
exit 1"#,
        );
        engine.initialize().await.unwrap();

        let (tx, _rx) = mpsc::channel(4);
        let err = engine
            .invoke(&args(&["-i", "input.mp4", "output.mp4"]), tx)
            .await
            .unwrap_err();

        match err {
            ConversionError::Failed { stderr, .. } => {
                let stderr = stderr.unwrap();
                assert!(stderr.contains("Invalid data found"));
                assert!(stderr.contains('\u{FFFD}'));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_storage_rejects_path_names() {
        let engine = FfmpegEngine::with_defaults();
        assert!(matches!(
            engine.retrieve_output("../secret").await,
            Err(ConversionError::InvalidName { .. })
        ));
        assert!(matches!(
            engine.remove("a/b").await,
            Err(ConversionError::InvalidName { .. })
        ));
    }
}
