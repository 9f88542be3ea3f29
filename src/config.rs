//! Configuration System
//!
//! Layered configuration for the blob store endpoint, the tracked message
//! topic, and logging. Sources merge in order: built-in defaults, the global
//! config file, workspace config files, then `FRAMEVIEW_*` environment
//! variables.

use crate::cas::fetcher::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
use crate::cas::HttpBlobFetcher;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::types::MESSAGE_TOPIC;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use merge::merge_policy::DEFAULT_CAS_BASE_URL;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameviewConfig {
    /// Content-addressable blob store
    #[serde(default)]
    pub cas: CasConfig,

    /// Thread store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Blob store endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CasConfig {
    /// Base URL; blobs are fetched from `{base_url}/{hash}`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_CAS_BASE_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_secs()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

impl Default for CasConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl CasConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url cannot be empty".to_string());
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "base_url must start with http:// or https:// (got '{}')",
                self.base_url
            ));
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err("timeouts must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Build the HTTP fetcher this configuration describes
    pub fn build_fetcher(&self) -> Result<HttpBlobFetcher, ApiError> {
        HttpBlobFetcher::with_timeouts(
            self.base_url.clone(),
            Duration::from_secs(self.connect_timeout_secs),
            Duration::from_secs(self.request_timeout_secs),
        )
    }
}

/// Thread store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Topic of frames that take part in threads
    #[serde(default = "default_message_topic")]
    pub message_topic: String,
}

fn default_message_topic() -> String {
    MESSAGE_TOPIC.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            message_topic: default_message_topic(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Cas(String),
    Store(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Cas(msg) => write!(f, "cas: {}", msg),
            ValidationError::Store(msg) => write!(f, "store: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl FrameviewConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.cas.validate() {
            errors.push(ValidationError::Cas(e));
        }
        if self.store.message_topic.trim().is_empty() {
            errors.push(ValidationError::Store(
                "message_topic cannot be empty".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding all problems into one error
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}
