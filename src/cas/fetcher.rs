//! Blob fetchers
//!
//! The content cache resolves hashes through an injected [`BlobFetcher`].
//! [`HttpBlobFetcher`] talks to a remote content-addressable store over HTTP;
//! [`FnFetcher`] adapts any async closure.

use crate::error::{ApiError, FetchError};
use async_trait::async_trait;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Asynchronous, fallible `hash -> content` lookup
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    async fn fetch(&self, hash: &str) -> Result<String, FetchError>;
}

/// Adapter turning an async closure into a [`BlobFetcher`]
pub struct FnFetcher<F> {
    f: F,
}

impl<F> FnFetcher<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> BlobFetcher for FnFetcher<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, FetchError>> + Send + 'static,
{
    async fn fetch(&self, hash: &str) -> Result<String, FetchError> {
        (self.f)(hash.to_string()).await
    }
}

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn build_blob_http_client(
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<Client, ApiError> {
    Client::builder()
        .no_proxy()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| ApiError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

fn map_http_error(hash: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(hash.to_string())
    } else if error.is_connect() {
        FetchError::Transport(format!("Connection error: {}", error))
    } else {
        FetchError::Transport(format!("HTTP error: {}", error))
    }
}

/// Fetches blobs with `GET {base_url}/{hash}`
pub struct HttpBlobFetcher {
    client: Client,
    base_url: String,
}

impl HttpBlobFetcher {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeouts(base_url, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = build_blob_http_client(connect_timeout, request_timeout)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn blob_url(&self, hash: &str) -> String {
        format!("{}/{}", self.base_url, hash)
    }
}

#[async_trait]
impl BlobFetcher for HttpBlobFetcher {
    async fn fetch(&self, hash: &str) -> Result<String, FetchError> {
        let url = self.blob_url(hash);
        debug!(url = %url, "Fetching blob");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| map_http_error(hash, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                404 => FetchError::NotFound(hash.to_string()),
                code => FetchError::Status {
                    hash: hash.to_string(),
                    status: code,
                },
            });
        }

        response.text().await.map_err(|e| map_http_error(hash, e))
    }
}
