//! In-memory result sink.

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::metrics;

use super::error::SinkError;
use super::types::{DisplayHandle, ResultArtifact, OUTPUT_CONTENT_TYPE};

/// Holds the live result and hands out its display handle.
#[derive(Debug, Clone, Default)]
pub struct ResultSink {
    current: Arc<RwLock<Option<ResultArtifact>>>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes output bytes and returns their handle.
    ///
    /// A previously published handle is revoked first.
    pub async fn publish(&self, bytes: Vec<u8>) -> Result<DisplayHandle, SinkError> {
        if bytes.is_empty() {
            return Err(SinkError::EmptyOutput);
        }

        let mut current = self.current.write().await;
        if let Some(previous) = current.take() {
            debug!(locator = %previous.handle, "Revoking superseded result");
            metrics::LIVE_DISPLAY_HANDLES.dec();
        }

        let artifact = ResultArtifact {
            handle: DisplayHandle::generate(),
            content_type: OUTPUT_CONTENT_TYPE,
            bytes: Arc::new(bytes),
            published_at: Utc::now(),
        };
        let handle = artifact.handle.clone();

        info!(locator = %handle, bytes = artifact.len(), "Published result");
        *current = Some(artifact);
        metrics::LIVE_DISPLAY_HANDLES.inc();

        Ok(handle)
    }

    /// Revokes a handle. Retiring an already revoked handle does nothing.
    pub async fn retire(&self, handle: &DisplayHandle) {
        let mut current = self.current.write().await;
        if current.as_ref().is_some_and(|a| &a.handle == handle) {
            *current = None;
            metrics::LIVE_DISPLAY_HANDLES.dec();
            debug!(locator = %handle, "Retired result");
        }
    }

    /// Bytes behind a live handle, for the player surface.
    pub async fn open(&self, handle: &DisplayHandle) -> Result<Arc<Vec<u8>>, SinkError> {
        self.current
            .read()
            .await
            .as_ref()
            .filter(|a| &a.handle == handle)
            .map(|a| Arc::clone(&a.bytes))
            .ok_or_else(|| SinkError::revoked(handle.locator.clone()))
    }

    /// Writes the result behind a live handle to `path`.
    pub async fn download(&self, handle: &DisplayHandle, path: &Path) -> Result<u64, SinkError> {
        let bytes = self.open(handle).await?;
        tokio::fs::write(path, bytes.as_slice())
            .await
            .map_err(|source| SinkError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        info!(locator = %handle, path = %path.display(), "Saved result");
        Ok(bytes.len() as u64)
    }

    /// The live artifact, if any.
    pub async fn current(&self) -> Option<ResultArtifact> {
        self.current.read().await.clone()
    }

    /// Number of live handles: 0 or 1.
    pub async fn live_handles(&self) -> usize {
        usize::from(self.current.read().await.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_and_open() {
        let sink = ResultSink::new();
        let handle = sink.publish(b"clip".to_vec()).await.unwrap();

        assert!(handle.locator.starts_with("blob:shortify/"));
        assert_eq!(sink.open(&handle).await.unwrap().as_slice(), b"clip");
        assert_eq!(sink.live_handles().await, 1);

        let artifact = sink.current().await.unwrap();
        assert_eq!(artifact.content_type, "video/mp4");
        assert_eq!(artifact.handle, handle);
    }

    #[tokio::test]
    async fn test_publish_revokes_previous() {
        let sink = ResultSink::new();
        let first = sink.publish(b"one".to_vec()).await.unwrap();
        let second = sink.publish(b"two".to_vec()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(sink.live_handles().await, 1);
        assert!(matches!(
            sink.open(&first).await,
            Err(SinkError::Revoked { .. })
        ));
        assert_eq!(sink.open(&second).await.unwrap().as_slice(), b"two");
    }

    #[tokio::test]
    async fn test_publish_empty_rejected() {
        let sink = ResultSink::new();
        let previous = sink.publish(b"keep".to_vec()).await.unwrap();

        let err = sink.publish(Vec::new()).await.unwrap_err();
        assert!(matches!(err, SinkError::EmptyOutput));
        // A rejected publish leaves the live result alone
        assert!(sink.open(&previous).await.is_ok());
    }

    #[tokio::test]
    async fn test_retire() {
        let sink = ResultSink::new();
        let handle = sink.publish(b"clip".to_vec()).await.unwrap();

        sink.retire(&handle).await;
        assert_eq!(sink.live_handles().await, 0);
        assert!(sink.open(&handle).await.is_err());

        // Second retire is a no-op
        sink.retire(&handle).await;
        assert_eq!(sink.live_handles().await, 0);
    }

    #[tokio::test]
    async fn test_retire_stale_handle_keeps_current() {
        let sink = ResultSink::new();
        let stale = sink.publish(b"old".to_vec()).await.unwrap();
        let live = sink.publish(b"new".to_vec()).await.unwrap();

        sink.retire(&stale).await;
        assert_eq!(sink.live_handles().await, 1);
        assert!(sink.open(&live).await.is_ok());
    }

    #[tokio::test]
    async fn test_download() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.mp4");

        let sink = ResultSink::new();
        let handle = sink.publish(b"mp4-bytes".to_vec()).await.unwrap();

        let written = sink.download(&handle, &path).await.unwrap();
        assert_eq!(written, 9);
        assert_eq!(std::fs::read(&path).unwrap(), b"mp4-bytes");

        sink.retire(&handle).await;
        let err = sink.download(&handle, &path).await.unwrap_err();
        assert!(matches!(err, SinkError::Revoked { .. }));
    }

    #[tokio::test]
    async fn test_download_to_missing_directory() {
        let sink = ResultSink::new();
        let handle = sink.publish(b"x".to_vec()).await.unwrap();

        let err = sink
            .download(&handle, Path::new("/nonexistent/dir/short.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
    }
}
