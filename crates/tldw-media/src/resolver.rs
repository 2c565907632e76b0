//! Resolution of video-sharing links into direct stream URLs.
//!
//! A [`ResolverChain`] holds an ordered list of [`StreamResolver`]
//! backends and tries them one at a time until one yields a URL. The
//! bundled [`JsonApiResolver`] speaks the common "status/url/picker" JSON
//! protocol used by public resolver instances.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use tldw_models::CanonicalLink;

use crate::config::AcquisitionConfig;
use crate::error::{MediaError, MediaResult};
use crate::metrics::record_resolver_attempt;

/// A URL believed to point at a fetchable media stream.
///
/// Produced by exactly one resolver backend. Not guaranteed to be
/// fetchable; streams can expire quickly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStream {
    pub url: String,
    /// Name of the backend that produced the URL
    pub backend: String,
}

/// One resolver backend.
#[async_trait]
pub trait StreamResolver: Send + Sync {
    /// Name of the backend (for logging and metrics)
    fn name(&self) -> &str;

    /// Turn a canonical link into a direct stream URL.
    async fn resolve(&self, link: &CanonicalLink) -> MediaResult<ResolvedStream>;
}

// =============================================================================
// JSON API backend
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveRequest<'a> {
    url: &'a str,
    filename_pattern: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    status: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    picker: Vec<PickerItem>,
}

#[derive(Debug, Deserialize)]
struct PickerItem {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Resolver backend speaking the `{status, url, picker}` JSON protocol.
pub struct JsonApiResolver {
    endpoint: String,
    filename_pattern: String,
    timeout: Duration,
    http: Client,
}

impl JsonApiResolver {
    pub fn new(
        endpoint: impl Into<String>,
        filename_pattern: impl Into<String>,
        timeout: Duration,
        http: Client,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            filename_pattern: filename_pattern.into(),
            timeout,
            http,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl StreamResolver for JsonApiResolver {
    fn name(&self) -> &str {
        &self.endpoint
    }

    async fn resolve(&self, link: &CanonicalLink) -> MediaResult<ResolvedStream> {
        let timeout_secs = self.timeout.as_secs();
        let request = ResolveRequest {
            url: link.as_str(),
            filename_pattern: &self.filename_pattern,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| MediaError::from_transport(e, timeout_secs))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        // An HTML error page with a 200 must not be parsed as a result.
        if !is_structured_content_type(&content_type) {
            let found = if content_type.is_empty() {
                "<none>".to_string()
            } else {
                content_type
            };
            return Err(MediaError::unexpected_content_type("application/json", found));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| MediaError::from_transport(e, timeout_secs))?;
        let payload: ResolveResponse = serde_json::from_slice(&body)?;
        debug!(backend = %self.endpoint, status = %payload.status, "Resolver replied");

        let outcome = interpret(payload);

        if !status.is_success() {
            return Err(match outcome {
                Err(rejected @ MediaError::ResolverRejected(_)) => rejected,
                _ => MediaError::http_status(status.as_u16(), &self.endpoint),
            });
        }

        outcome.map(|url| ResolvedStream {
            url,
            backend: self.endpoint.clone(),
        })
    }
}

/// `application/json` or any `+json` structured type.
fn is_structured_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Map a resolver payload onto a stream URL or a per-backend failure.
fn interpret(payload: ResolveResponse) -> MediaResult<String> {
    match payload.status.as_str() {
        "error" => Err(MediaError::ResolverRejected(
            payload
                .text
                .unwrap_or_else(|| "no detail provided".to_string()),
        )),
        "picker" => payload
            .picker
            .into_iter()
            .find(|item| item.kind.as_deref() == Some("video"))
            .and_then(|item| item.url)
            .filter(|url| !url.is_empty())
            .ok_or(MediaError::NoVideoCandidate),
        "stream" | "redirect" => payload
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| MediaError::invalid_response("stream status without url")),
        other => Err(MediaError::UnrecognizedStatus(other.to_string())),
    }
}

// =============================================================================
// Chain
// =============================================================================

/// Ordered resolver fallback. First success wins; no racing.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn StreamResolver>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the chain of JSON API backends listed in the config.
    pub fn from_config(config: &AcquisitionConfig, http: &Client) -> Self {
        let mut chain = Self::new();
        for endpoint in &config.resolver_endpoints {
            chain.add_resolver(Box::new(JsonApiResolver::new(
                endpoint.clone(),
                config.filename_pattern.clone(),
                config.attempt_timeout,
                http.clone(),
            )));
        }
        chain
    }

    pub fn add_resolver(&mut self, resolver: Box<dyn StreamResolver>) {
        self.resolvers.push(resolver);
    }

    pub fn with_resolver(mut self, resolver: Box<dyn StreamResolver>) -> Self {
        self.add_resolver(resolver);
        self
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Try every backend in order until one resolves the link.
    ///
    /// Fails with [`MediaError::ResolutionExhausted`] carrying the last
    /// backend's error when none succeeds.
    pub async fn resolve(&self, link: &CanonicalLink) -> MediaResult<ResolvedStream> {
        let mut last_error = None;
        let mut attempts = 0;

        for resolver in &self.resolvers {
            attempts += 1;
            info!(backend = resolver.name(), attempt = attempts, "Trying resolver backend");

            match resolver.resolve(link).await {
                Ok(stream) => {
                    record_resolver_attempt(resolver.name(), true);
                    info!(backend = resolver.name(), "Resolved stream URL");
                    return Ok(stream);
                }
                Err(e) => {
                    record_resolver_attempt(resolver.name(), false);
                    warn!(backend = resolver.name(), error = %e, "Resolver backend failed");
                    last_error = Some(e);
                }
            }
        }

        Err(MediaError::ResolutionExhausted {
            attempts,
            last: Box::new(last_error.unwrap_or(MediaError::NoBackends("resolver"))),
        })
    }
}
