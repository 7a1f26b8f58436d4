//! Mock media fetcher for testing.

use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::source::{FetchedMedia, InputError, MediaFetcher};

#[derive(Debug, Clone)]
enum MockResponse {
    Body {
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
    Status(u16),
    NetworkError(String),
}

/// Mock implementation of the MediaFetcher trait.
///
/// Links without a configured response answer with HTTP 404. Clones share
/// state.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    /// Every URL fetched, in order.
    requests: Arc<RwLock<Vec<String>>>,
    /// Simulated latency in milliseconds.
    delay_ms: Arc<RwLock<u64>>,
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `url`.
    pub async fn set_response(&self, url: &str, content_type: Option<&str>, bytes: Vec<u8>) {
        self.responses.write().await.insert(
            normalize(url),
            MockResponse::Body {
                content_type: content_type.map(str::to_string),
                bytes,
            },
        );
    }

    /// Answer `url` with a non-success status.
    pub async fn set_status(&self, url: &str, status: u16) {
        self.responses
            .write()
            .await
            .insert(normalize(url), MockResponse::Status(status));
    }

    /// Fail `url` before any response arrives.
    pub async fn set_network_error(&self, url: &str, reason: &str) {
        self.responses
            .write()
            .await
            .insert(normalize(url), MockResponse::NetworkError(reason.to_string()));
    }

    /// Set the simulated latency of every fetch.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay_ms.write().await = delay.as_millis() as u64;
    }

    /// Get all fetched URLs.
    pub async fn recorded_requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    /// Get the number of fetches performed.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &Url) -> Result<FetchedMedia, InputError> {
        self.requests.write().await.push(url.to_string());

        let delay_ms = *self.delay_ms.read().await;
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        let response = self.responses.read().await.get(url.as_str()).cloned();
        match response {
            Some(MockResponse::Body {
                content_type,
                bytes,
            }) => Ok(FetchedMedia {
                content_type,
                bytes,
            }),
            Some(MockResponse::Status(status)) => Err(InputError::HttpStatus {
                url: url.to_string(),
                status,
            }),
            Some(MockResponse::NetworkError(reason)) => Err(InputError::network(url.as_str(), reason)),
            None => Err(InputError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
