//! Source resolver implementation.

use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, info};

use crate::metrics;

use super::error::InputError;
use super::fetcher::MediaFetcher;
use super::types::{
    InputOrigin, MediaInput, Selection, DEFAULT_CONTENT_TYPE, DEFAULT_EXTENSION,
    DEFAULT_FILE_NAME,
};

/// Resolves selections into [`MediaInput`]s.
///
/// Holds no mutable state; the only side effect is the network call made for
/// link selections.
pub struct SourceResolver<F: MediaFetcher> {
    fetcher: Arc<F>,
}

impl<F: MediaFetcher> Clone for SourceResolver<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<F: MediaFetcher> SourceResolver<F> {
    /// Creates a new resolver around a fetcher.
    pub fn new(fetcher: F) -> Self {
        Self::from_shared(Arc::new(fetcher))
    }

    /// Creates a resolver sharing an existing fetcher.
    pub fn from_shared(fetcher: Arc<F>) -> Self {
        Self { fetcher }
    }

    /// Resolves a selection. A selected file takes precedence over a link.
    pub async fn resolve(&self, selection: Selection) -> Result<MediaInput, InputError> {
        let url = selection.trimmed_url().map(str::to_string);

        if let Some(file) = selection.file {
            if url.is_some() {
                debug!(file = %file.name, "Both file and link selected, using the file");
            }
            info!(name = %file.name, bytes = file.bytes.len(), "Using selected file");
            return Ok(MediaInput::from(file));
        }

        let Some(raw_url) = url else {
            return Err(InputError::NoInput);
        };

        let parsed = parse_media_url(&raw_url)?;
        let fetched = self.fetcher.fetch(&parsed).await?;
        metrics::BYTES_FETCHED.inc_by(fetched.bytes.len() as u64);

        let name = derive_file_name(&parsed);
        let content_type = fetched
            .content_type
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        info!(
            url = %parsed,
            name = %name,
            content_type = %content_type,
            bytes = fetched.bytes.len(),
            "Fetched media from link"
        );

        Ok(MediaInput::new(
            name,
            content_type,
            fetched.bytes,
            InputOrigin::Url { url: raw_url },
        ))
    }
}

fn parse_media_url(raw: &str) -> Result<Url, InputError> {
    let url = Url::parse(raw).map_err(|e| InputError::invalid_url(raw, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(InputError::invalid_url(
            raw,
            format!("unsupported scheme {:?}", other),
        )),
    }
}

/// Names fetched media after the link's last path segment.
///
/// An empty segment gives the default name; a segment without a dot gets the
/// default extension appended. The segment is used as it appears in the link,
/// percent-encoding included (`my%20clip.mp4` stays `my%20clip.mp4`).
pub fn derive_file_name(url: &Url) -> String {
    let last = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty());

    match last {
        None => DEFAULT_FILE_NAME.to_string(),
        Some(segment) if segment.contains('.') => segment.to_string(),
        Some(segment) => format!("{}.{}", segment, DEFAULT_EXTENSION),
    }
}
