//! Transcoding engine boundary.
//!
//! The engine is an opaque collaborator that decodes, filters and re-encodes
//! media given a command-style parameter list. It owns a working storage area
//! where input and output buffers live under logical names.
//!
//! # Example
//!
//! ```ignore
//! use shortify_core::engine::{EngineConfig, FfmpegEngine, TranscodeEngine};
//!
//! let engine = FfmpegEngine::new(EngineConfig::default());
//! engine.initialize().await?;
//!
//! engine.stage_input("input.mp4", &bytes).await?;
//! engine.invoke(&argv, progress_tx).await?;
//! let output = engine.retrieve_output("output.mp4").await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::EngineConfig;
pub use error::{ConversionError, EngineError};
pub use ffmpeg::FfmpegEngine;
pub use traits::TranscodeEngine;
pub use types::{validate_logical_name, ProgressSample, ProgressSender};
