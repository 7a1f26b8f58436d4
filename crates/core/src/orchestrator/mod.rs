//! Job orchestrator: sequences one conversion per user request.
//!
//! The orchestrator owns the job state machine:
//! - **Idle** accepts a submit and moves to **Acquiring**
//! - **Acquiring** resolves the selection, then **Converting** runs the job
//! - **Done** / **Failed** stay visible for a settle delay before **Idle**
//!
//! Only one job exists at a time. A submit while a job is in flight or
//! settling is rejected, never queued.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::Orchestrator;
pub use types::{JobEvent, JobState, OrchestratorError};
