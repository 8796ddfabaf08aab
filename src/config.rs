use serde::{Deserialize, Serialize};

/// Default entry point of the IMF SDMX-JSON REST service.
pub const DEFAULT_BASE_URL: &str = "http://dataservices.imf.org/REST/SDMX_JSON.svc";

/// Connection settings for [`crate::Client`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Total request timeout.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 5,
            user_agent: concat!("imf_dots/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Base URL without a trailing slash, ready for `format!("{}/...")`.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
