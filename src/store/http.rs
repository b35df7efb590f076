//! HTTP document retrieval

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from a single retrieval attempt.
///
/// The store treats any of these as "try the next candidate location".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },
}

/// Retrieves raw document bytes from one remote location.
///
/// Implemented over HTTPS in production; tests substitute canned fetchers.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`DocumentFetcher`] over a shared `reqwest` client.
///
/// Each attempt carries its own timeout, since the store retries across
/// candidate locations and a hung location must not stall the run.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
