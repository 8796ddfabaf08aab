//! Synchronous client for the **IMF SDMX-JSON REST service**.
//!
//! The client owns the HTTP transport and the two reference-data caches
//! (countries and databases). Search and metadata lookups live in
//! [`crate::catalog`], trade retrieval in [`crate::dots`].
//!
//! ### Notes
//! - Requests are blocking and never retried; a non-success status surfaces
//!   as [`Error::Remote`].
//! - Timeouts come from [`ClientConfig`] (30s total, 10s connect by default).
//!
//! Typical usage:
//! ```no_run
//! # use imf_dots::{Client, DotsQuery};
//! let client = Client::default();
//! let germany = client.country_search("germany", false)?;
//! let table = client.dots(&DotsQuery::new("US", "CN", 1995, 2020))?;
//! # Ok::<(), imf_dots::Error>(())
//! ```

use crate::catalog::TableCache;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{CountryCode, DatabaseCode};
use log::{debug, info};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Anything that can answer a GET with a JSON document.
///
/// The reqwest-backed [`HttpTransport`] is the default; tests plug in an
/// in-memory implementation.
pub trait Transport: Send + Sync {
    fn get_json(&self, url: &str) -> Result<Value>;
}

/// Blocking reqwest transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, url: &str) -> Result<Value> {
        debug!("GET {}", url);
        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| Error::remote(format!("GET {}: {}", url, e)))?;
        let status = resp.status();
        info!("GET {} -> {}", url, status);
        if !status.is_success() {
            return Err(Error::remote(format!(
                "request failed with HTTP {} (GET {})",
                status, url
            )));
        }
        resp.json()
            .map_err(|e| Error::remote(format!("decode json from {}: {}", url, e)))
    }
}

pub struct Client {
    pub(crate) config: ClientConfig,
    pub(crate) transport: Box<dyn Transport>,
    pub(crate) countries: TableCache<CountryCode>,
    pub(crate) databases: TableCache<DatabaseCode>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("countries", &self.countries)
            .field("databases", &self.databases)
            .finish_non_exhaustive()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(ClientConfig::default()).expect("reqwest client build")
    }
}

impl Client {
    /// Build a client talking to the real service over HTTP.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Build a client on top of a custom transport.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Box::new(transport),
            countries: TableCache::default(),
            databases: TableCache::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET {base}/{path}` through the configured transport.
    pub(crate) fn get(&self, path: &str) -> Result<Value> {
        let url = format!("{}/{}", self.config.base(), path);
        self.transport.get_json(&url)
    }
}

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Percent-encode a single code for use as a URL path segment.
pub(crate) fn enc(code: &str) -> String {
    percent_encoding::utf8_percent_encode(code.trim(), SAFE).to_string()
}
