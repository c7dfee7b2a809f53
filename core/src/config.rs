//! Connection configuration and adapter parameters.
//!
//! # Design
//! The search client hands the transport an explicit `ConnectionConfig`
//! instead of an ambient key/value bag. Every field has a default so a config
//! can be deserialized from a partial JSON object.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9200;
/// Seconds.
pub const DEFAULT_TIMEOUT: u64 = 300;

/// Where and how to reach one search node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Full base URL. When set and non-empty it is used verbatim and the
    /// host, port and path fields are ignored.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    /// Path prefix placed between `host:port` and the request path.
    pub path: Option<String>,
    pub headers: BTreeMap<String, String>,
    /// Seconds; zero disables the timeout.
    pub timeout: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: None,
            headers: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    pub fn with_header(mut self, name: &str, value: impl ToString) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// The explicit base URL, if one is configured and non-empty.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    /// The path prefix, if one is configured and non-empty.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref().filter(|path| !path.is_empty())
    }

    /// `None` unless the configured timeout is strictly positive.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}

/// Per-call adapter parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransportParams {
    /// Attach the request body to the outgoing request. Without it the body
    /// is never sent, even when the request carries one.
    pub post_with_request_body: bool,
}

impl TransportParams {
    pub fn post_with_request_body() -> Self {
        Self {
            post_with_request_body: true,
        }
    }
}
