//! Types for the result sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Media type every published result is tagged with.
pub const OUTPUT_CONTENT_TYPE: &str = "video/mp4";

const LOCATOR_PREFIX: &str = "blob:shortify/";

/// Revocable locator for a published result.
///
/// The player surface and the download link share the same handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayHandle {
    pub id: Uuid,
    pub locator: String,
}

impl DisplayHandle {
    pub(crate) fn generate() -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            locator: format!("{}{}", LOCATOR_PREFIX, id),
        }
    }
}

impl fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.locator)
    }
}

/// A published clip.
#[derive(Debug, Clone)]
pub struct ResultArtifact {
    pub handle: DisplayHandle,
    pub content_type: &'static str,
    pub bytes: Arc<Vec<u8>>,
    pub published_at: DateTime<Utc>,
}

impl ResultArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
