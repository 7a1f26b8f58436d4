//! Result sink: publishes converted clips behind revocable display handles.
//!
//! At most one result is live at a time. Publishing a new one revokes the
//! previous handle before the new one is handed out.

mod error;
mod store;
mod types;

pub use error::SinkError;
pub use store::ResultSink;
pub use types::{DisplayHandle, ResultArtifact, OUTPUT_CONTENT_TYPE};
