//! Error types for the frameview thread and content system.

use crate::types::{ContentHash, FrameId};
use thiserror::Error;

/// Blob fetch errors
///
/// Cloned into every caller coalesced onto the same fetch, so payloads are
/// rendered to strings at the point of failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Content not found: {0}")]
    NotFound(ContentHash),

    #[error("Fetch for {hash} failed with status {status}")]
    Status { hash: ContentHash, status: u16 },

    #[error("Fetch for {0} timed out")]
    Timeout(ContentHash),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Fetch task aborted: {0}")]
    Aborted(String),
}

/// Frame stream errors
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Stream I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed frame at line {line}: {reason}")]
    Decode { line: usize, reason: String },
}

/// API-level errors surfaced by the CLI and configuration layer
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Frame not found: {0}")]
    FrameNotFound(FrameId),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Content fetch error: {0}")]
    FetchError(#[from] FetchError),

    #[error("Stream error: {0}")]
    StreamError(#[from] StreamError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
