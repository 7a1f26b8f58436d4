//! Job runner: one conversion against the shared engine.
//!
//! Each run lazily brings the engine up, stages the input under a fixed
//! logical name, invokes the engine with the fixed [`ConversionRequest`],
//! reads the output back and frees both storage entries whatever happened.

mod error;
mod job;
mod types;

pub use error::RunError;
pub use job::JobRunner;
pub use types::{ConversionOutput, ConversionRequest, Preset, VideoCodec, INPUT_NAME, OUTPUT_NAME};
