//! Acquisition configuration.

use std::time::Duration;

/// Public resolver instances, tried in this order.
pub const DEFAULT_RESOLVER_ENDPOINTS: [&str; 3] = [
    "https://api.cobalt.tools/api/json",
    "https://co.wuk.sh/api/json",
    "https://cobalt.api.timelessnesses.me/api/json",
];

/// Public CORS relays, tried in this order. `{url}` receives the
/// percent-encoded source URL.
pub const DEFAULT_RELAY_TEMPLATES: [&str; 3] = [
    "https://corsproxy.io/?url={url}",
    "https://api.allorigins.win/raw?url={url}",
    "https://api.codetabs.com/v1/proxy?quest={url}",
];

/// Configuration for the resolver and download chains.
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Resolver backend endpoints in fallback order
    pub resolver_endpoints: Vec<String>,
    /// Relay URL templates in fallback order
    pub relay_templates: Vec<String>,
    /// Ceiling for a single resolver or relay attempt, body included
    pub attempt_timeout: Duration,
    /// Connect timeout for every request
    pub connect_timeout: Duration,
    /// Filename-pattern hint sent to resolver backends
    pub filename_pattern: String,
    /// Reject bodies larger than this many bytes. `TLDW_MAX_DOWNLOAD_MB`
    /// values of zero or ones that overflow leave it unset.
    pub max_download_bytes: Option<u64>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            resolver_endpoints: DEFAULT_RESOLVER_ENDPOINTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            relay_templates: DEFAULT_RELAY_TEMPLATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            attempt_timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(5),
            filename_pattern: "basic".to_string(),
            max_download_bytes: None,
        }
    }
}

impl AcquisitionConfig {
    /// Create config from environment variables.
    ///
    /// Unset or unparsable values fall back to [`AcquisitionConfig::default`].
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            resolver_endpoints: env_list("TLDW_RESOLVER_ENDPOINTS")
                .unwrap_or(defaults.resolver_endpoints),
            relay_templates: env_list("TLDW_RELAY_TEMPLATES").unwrap_or(defaults.relay_templates),
            attempt_timeout: std::env::var("TLDW_ATTEMPT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.attempt_timeout),
            connect_timeout: std::env::var("TLDW_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            filename_pattern: std::env::var("TLDW_FILENAME_PATTERN")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.filename_pattern),
            max_download_bytes: std::env::var("TLDW_MAX_DOWNLOAD_MB")
                .ok()
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|mb| *mb > 0)
                .and_then(|mb| mb.checked_mul(1024 * 1024)),
        }
    }

    /// Builder-style override of the resolver list.
    pub fn with_resolvers<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resolver_endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style override of the relay list.
    pub fn with_relays<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relay_templates = templates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_max_download_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_download_bytes = limit;
        self
    }
}

/// Comma-separated list; `None` when unset or empty.
fn env_list(key: &str) -> Option<Vec<String>> {
    let raw = std::env::var(key).ok()?;
    let items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
