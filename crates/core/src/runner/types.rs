//! Types for the job runner.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Logical name the input is staged under.
pub const INPUT_NAME: &str = "input.mp4";

/// Logical name the engine writes its output to.
pub const OUTPUT_NAME: &str = "output.mp4";

/// Video codec of the produced clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoCodec {
    /// H.264 / AVC
    H264,
    /// H.265 / HEVC
    H265,
}

impl VideoCodec {
    /// Returns the ffmpeg encoder name for this codec.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::H265 => "libx265",
        }
    }
}

/// x264/x265 encoding preset, fastest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    Medium,
    Slow,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ultrafast => "ultrafast",
            Self::Superfast => "superfast",
            Self::Veryfast => "veryfast",
            Self::Faster => "faster",
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
        }
    }

    /// Whether the preset trades compression for encoding speed.
    pub fn is_speed_biased(&self) -> bool {
        *self < Self::Medium
    }
}

/// The fixed conversion applied to every job.
///
/// Not configurable: every clip is the first 30 seconds, 720 pixels wide with
/// an even height, H.264 at a fast preset, with the index moved to the front
/// of the file so playback can start before the download finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Length kept from the start of the input.
    pub trim: Duration,
    /// Output width in pixels; height follows the aspect ratio.
    pub scale_width: u32,
    pub codec: VideoCodec,
    pub preset: Preset,
    /// Place the moov atom first.
    pub faststart: bool,
}

impl Default for ConversionRequest {
    fn default() -> Self {
        Self::standard()
    }
}

impl ConversionRequest {
    /// The short-clip policy.
    pub fn standard() -> Self {
        Self {
            trim: Duration::from_secs(30),
            scale_width: 720,
            codec: VideoCodec::H264,
            preset: Preset::Veryfast,
            faststart: true,
        }
    }

    /// Trim length as `HH:MM:SS`.
    pub fn trim_timestamp(&self) -> String {
        let secs = self.trim.as_secs();
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }

    /// Scale filter keeping the aspect ratio; `-2` rounds the height to even.
    pub fn scale_filter(&self) -> String {
        format!("scale={}:-2", self.scale_width)
    }

    /// Builds the engine argument list for one input/output pair.
    pub fn to_args(&self, input_name: &str, output_name: &str) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            input_name.to_string(),
            "-t".to_string(),
            self.trim_timestamp(),
            "-vf".to_string(),
            self.scale_filter(),
            "-c:v".to_string(),
            self.codec.ffmpeg_codec().to_string(),
            "-preset".to_string(),
            self.preset.as_str().to_string(),
        ];

        if self.faststart {
            args.extend(["-movflags".to_string(), "faststart".to_string()]);
        }

        args.push(output_name.to_string());
        args
    }
}

/// Bytes produced by a successful run.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub bytes: Vec<u8>,
    /// Wall-clock time of the run, engine start-up included.
    pub elapsed_ms: u64,
}
