//! Fetching media bodies from links.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

use super::config::SourceConfig;
use super::error::InputError;
use super::types::content_type_essence;

/// A fetched response body with its declared media type.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    /// Media type essence from the response, if it declared one.
    pub content_type: Option<String>,
    /// The full response body.
    pub bytes: Vec<u8>,
}

/// Retrieves the body behind a link.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Fetches `url`. Any non-2xx status is an error.
    async fn fetch(&self, url: &Url) -> Result<FetchedMedia, InputError>;
}

/// HTTP(S) fetcher backed by reqwest.
pub struct HttpFetcher {
    client: Client,
    max_bytes: Option<u64>,
}

impl HttpFetcher {
    /// Create a new HttpFetcher with the given configuration.
    pub fn new(config: &SourceConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self::with_client(client, config.max_download_bytes))
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(client: Client, max_bytes: Option<u64>) -> Self {
        Self { client, max_bytes }
    }

    fn check_limit(&self, len: u64) -> Result<(), InputError> {
        match self.max_bytes {
            Some(limit) if len > limit => Err(InputError::TooLarge { limit }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl MediaFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &Url) -> Result<FetchedMedia, InputError> {
        debug!(url = %url, "Fetching media");

        let mut response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                InputError::network(url.as_str(), "request timed out")
            } else {
                InputError::network(url.as_str(), e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(InputError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(content_type_essence);

        if let Some(declared) = response.content_length() {
            self.check_limit(declared)?;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| InputError::body(url.as_str(), e.to_string()))?
        {
            self.check_limit((bytes.len() + chunk.len()) as u64)?;
            bytes.extend_from_slice(&chunk);
        }

        debug!(url = %url, bytes = bytes.len(), "Fetched media");
        Ok(FetchedMedia {
            content_type,
            bytes,
        })
    }
}
