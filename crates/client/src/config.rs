//! Client configuration.

use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for repository analysis, which can run for minutes.
pub const DEFAULT_ANALYZE_TIMEOUT: Duration = Duration::from_secs(180);

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL, without the `/api/v1` prefix
    pub base_url: String,

    /// Timeout for ordinary requests
    pub timeout: Duration,

    /// Timeout for the analyze call
    pub analyze_timeout: Duration,

    /// User-Agent header
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: DEFAULT_TIMEOUT,
            analyze_timeout: DEFAULT_ANALYZE_TIMEOUT,
            user_agent: format!("vendorboard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Config for `base_url` with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
