//! Analysis client configuration.

use std::time::Duration;

use crate::error::{AnalysisError, AnalyzeResult};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Models tried in this order.
pub const DEFAULT_MODELS: [&str; 3] = ["gemini-2.5-flash", "gemini-2.5-flash-lite", "gemini-2.5-pro"];

const MB: u64 = 1024 * 1024;

/// Configuration for [`crate::GeminiAnalyzer`].
#[derive(Clone)]
pub struct AnalysisConfig {
    pub api_key: String,
    pub base_url: String,
    /// Ordered fallback list
    pub models: Vec<String>,
    /// Media up to this size is sent inline instead of uploaded
    pub inline_limit_bytes: u64,
    pub poll_interval: Duration,
    pub max_polls: u32,
    /// Ceiling for each upload, poll or generation request
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .field("inline_limit_bytes", &self.inline_limit_bytes)
            .field("poll_interval", &self.poll_interval)
            .field("max_polls", &self.max_polls)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl AnalysisConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            inline_limit_bytes: 20 * MB,
            poll_interval: Duration::from_millis(2000),
            max_polls: 150,
            request_timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Create config from environment variables.
    ///
    /// `GEMINI_API_KEY` is required; everything else falls back to the
    /// defaults of [`AnalysisConfig::new`].
    pub fn from_env() -> AnalyzeResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AnalysisError::config("GEMINI_API_KEY not set"))?;

        let mut config = Self::new(api_key);

        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            if !base_url.trim().is_empty() {
                config.base_url = base_url.trim().trim_end_matches('/').to_string();
            }
        }

        if let Ok(models) = std::env::var("GEMINI_MODELS") {
            let models: Vec<String> = models
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
            if !models.is_empty() {
                config.models = models;
            }
        }

        if let Some(bytes) = env_parse::<u64>("TLDW_INLINE_LIMIT_MB")
            .and_then(|mb| mb.checked_mul(MB))
        {
            config.inline_limit_bytes = bytes;
        }
        if let Some(ms) = env_parse::<u64>("TLDW_POLL_INTERVAL_MS").filter(|ms| *ms > 0) {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(polls) = env_parse::<u32>("TLDW_MAX_POLLS").filter(|p| *p > 0) {
            config.max_polls = polls;
        }
        if let Some(secs) = env_parse::<u64>("TLDW_ANALYSIS_TIMEOUT_SECS").filter(|s| *s > 0) {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("TLDW_CONNECT_TIMEOUT_SECS").filter(|s| *s > 0) {
            config.connect_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_inline_limit(mut self, bytes: u64) -> Self {
        self.inline_limit_bytes = bytes;
        self
    }

    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
