//! Progress reporter implementation.

use serde::{Deserialize, Serialize};

/// Clamps an engine ratio into `[0, 1]`. Non-finite ratios count as 0.
pub fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Renders a ratio as a percentage with two decimals, e.g. `42.50%`.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", clamp_ratio(ratio) * 100.0)
}

/// What the progress indicator shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressDisplay {
    /// Displayed fraction, in `[0, 1]`.
    pub ratio: f64,
    /// Displayed text, e.g. `42.50%`.
    pub percent: String,
}

impl ProgressDisplay {
    fn from_ratio(ratio: f64) -> Self {
        Self {
            ratio,
            percent: format_percent(ratio),
        }
    }
}

/// Maps engine samples to a bounded indicator that never moves backwards
/// within a job.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    floor: f64,
    visible: bool,
}

impl ProgressReporter {
    /// A hidden indicator at 0%.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to 0% and shows the indicator for a new job.
    pub fn start(&mut self) -> ProgressDisplay {
        self.floor = 0.0;
        self.visible = true;
        self.display()
    }

    /// Folds one engine sample into the indicator.
    pub fn on_sample(&mut self, ratio: f64) -> ProgressDisplay {
        let clamped = clamp_ratio(ratio);
        if clamped > self.floor {
            self.floor = clamped;
        }
        self.display()
    }

    /// Hides the indicator. The value is kept until the next `start`.
    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn display(&self) -> ProgressDisplay {
        ProgressDisplay::from_ratio(self.floor)
    }
}
