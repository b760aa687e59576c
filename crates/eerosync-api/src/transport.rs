// Shared transport configuration for building the session's reqwest::Client.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api-user.e2ro.com";

const USER_AGENT: &str = concat!("eerosync/", env!("CARGO_PKG_VERSION"));

/// Transport configuration for [`Session`](crate::Session).
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// API host; relative resource paths are joined onto it.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// When set, every decoded response payload is written here as JSON.
    pub dump_dir: Option<PathBuf>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: Duration::from_secs(30),
            dump_dir: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| Error::Client(e.to_string()))
    }
}

/// Parsed [`DEFAULT_BASE_URL`].
pub fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}
