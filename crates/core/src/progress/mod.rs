//! Progress reporting: engine ratios to a displayable indicator.

mod reporter;

pub use reporter::{clamp_ratio, format_percent, ProgressDisplay, ProgressReporter};
