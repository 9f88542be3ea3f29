//! Merge rules: defaults, override order, conflict handling.

use crate::cas::fetcher::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
use crate::types::MESSAGE_TOPIC;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

pub const DEFAULT_CAS_BASE_URL: &str = "http://localhost:3021/api/cas";

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("cas.base_url", DEFAULT_CAS_BASE_URL)?
        .set_default(
            "cas.connect_timeout_secs",
            DEFAULT_CONNECT_TIMEOUT.as_secs() as i64,
        )?
        .set_default(
            "cas.request_timeout_secs",
            DEFAULT_REQUEST_TIMEOUT.as_secs() as i64,
        )?
        .set_default("store.message_topic", MESSAGE_TOPIC)
}
