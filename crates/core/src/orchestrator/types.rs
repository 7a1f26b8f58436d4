//! Types for the job orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::engine::{ConversionError, EngineError};
use crate::progress::ProgressDisplay;
use crate::runner::RunError;
use crate::sink::{DisplayHandle, SinkError};
use crate::source::InputError;

const NO_INPUT_NOTICE: &str = "Please select a video to process or paste a video link.";
const INPUT_FAILED_NOTICE: &str = "Unable to fetch video from the provided URL. Please ensure the link is direct to a video file or try another link.";
const PROCESSING_FAILED_NOTICE: &str =
    "An error occurred while processing the video. Please try another file.";
const BUSY_NOTICE: &str = "A video is already being processed. Please wait for it to finish.";

/// Lifecycle of the single job slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Idle,
    Acquiring,
    Converting,
    Done,
    Failed,
}

impl JobState {
    /// A job is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Acquiring | Self::Converting)
    }

    /// The job has finished and is waiting out the settle delay.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether the submit control is enabled.
    pub fn accepts_submit(&self) -> bool {
        *self == Self::Idle
    }

    /// Label of the submit control in this state.
    pub fn control_label(&self) -> &'static str {
        if self.accepts_submit() {
            "Generate short"
        } else {
            "Processing..."
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Acquiring => "acquiring",
            Self::Converting => "converting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification for the user interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum JobEvent {
    /// The job state changed.
    StateChanged(JobState),
    /// The progress indicator is shown with this value.
    Progress(ProgressDisplay),
    /// The progress indicator is hidden.
    ProgressHidden,
    /// A result is ready for the player and the download link.
    Published(DisplayHandle),
    /// User-facing message telling the user what to do next.
    Notice(String),
}

/// Errors that end or refuse a job.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Neither a file nor a link was selected.
    #[error("no input selected")]
    NoInput,

    /// Another job holds the slot.
    #[error("a job is already in progress")]
    Busy,

    /// The selection could not be turned into media.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// The engine could not be initialized.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// The engine failed on the input.
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// The result could not be published.
    #[error("result sink error: {0}")]
    Sink(#[from] SinkError),
}

impl From<RunError> for OrchestratorError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Engine(e) => Self::Engine(e),
            RunError::Conversion(e) => Self::Conversion(e),
        }
    }
}

impl OrchestratorError {
    /// What the user is told to do about this error.
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::NoInput | Self::Input(InputError::NoInput) => NO_INPUT_NOTICE,
            Self::Busy => BUSY_NOTICE,
            Self::Input(_) => INPUT_FAILED_NOTICE,
            Self::Engine(_) | Self::Conversion(_) | Self::Sink(_) => PROCESSING_FAILED_NOTICE,
        }
    }

    /// Whether the error refused the submit instead of failing a job.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::NoInput | Self::Busy)
    }

    pub(crate) fn metric_label(&self) -> &'static str {
        match self {
            Self::NoInput => "no_input",
            Self::Busy => "busy",
            Self::Input(_) => "input_failed",
            Self::Engine(_) => "engine_failed",
            Self::Conversion(_) => "conversion_failed",
            Self::Sink(_) => "publish_failed",
        }
    }
}
