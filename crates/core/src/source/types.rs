//! Types for source resolution.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::InputError;

/// Name used when a link has no usable last path segment.
pub const DEFAULT_FILE_NAME: &str = "input.mp4";

/// Extension appended to link-derived names that have none.
pub const DEFAULT_EXTENSION: &str = "mp4";

/// Content type assumed when a response does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

/// A file the user picked, with the metadata it was picked with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, declaring its type from the extension.
    pub async fn read(path: &Path) -> Result<Self, InputError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| InputError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
        let content_type = content_type_for_name(&name);

        Ok(Self::new(name, content_type, bytes))
    }
}

/// What the user selected: a file, a link, both or neither.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub file: Option<LocalFile>,
    pub url: Option<String>,
}

impl Selection {
    pub fn from_file(file: LocalFile) -> Self {
        Self {
            file: Some(file),
            url: None,
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            file: None,
            url: Some(url.into()),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// The link with surrounding whitespace removed, if anything is left.
    pub fn trimmed_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// True when there is nothing to resolve.
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.trimmed_url().is_none()
    }
}

/// Where a [`MediaInput`] came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputOrigin {
    File,
    Url { url: String },
}

/// Media bytes ready to be handed to a job. Immutable once built.
#[derive(Debug, Clone)]
pub struct MediaInput {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
    origin: InputOrigin,
}

impl MediaInput {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
        origin: InputOrigin,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
            origin,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn origin(&self) -> &InputOrigin {
        &self.origin
    }
}

impl From<LocalFile> for MediaInput {
    fn from(file: LocalFile) -> Self {
        Self::new(file.name, file.content_type, file.bytes, InputOrigin::File)
    }
}

/// Media type declared for a file name, by extension.
pub fn content_type_for_name(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("wmv") => "video/x-ms-wmv",
        Some("flv") => "video/x-flv",
        Some("ts") | Some("m2ts") => "video/mp2t",
        Some("mpg") | Some("mpeg") => "video/mpeg",
        Some("ogv") => "video/ogg",
        Some("3gp") => "video/3gpp",
        _ => "application/octet-stream",
    }
}

/// The `type/subtype` part of a Content-Type header value, lowercased.
pub fn content_type_essence(header: &str) -> Option<String> {
    let essence = header.split(';').next()?.trim();
    if essence.is_empty() || !essence.contains('/') {
        return None;
    }
    Some(essence.to_ascii_lowercase())
}
