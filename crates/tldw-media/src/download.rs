//! Byte download with a direct fast path and relay fallback.
//!
//! Direct file links are fetched as-is first. When that fails, or when the
//! URL came out of the resolver chain, the configured relays are tried in
//! order. Every attempt is bounded by the per-attempt timeout and the
//! optional byte ceiling.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, info, warn};

use tldw_models::{filename_from_url, normalize_mime, AcquiredMedia, INDIRECT_FILENAME};

use crate::config::AcquisitionConfig;
use crate::error::{MediaError, MediaResult};
use crate::metrics::record_relay_attempt;
use crate::relay::{Relay, RelayTemplate};

/// Attempt label used for the unproxied fetch.
pub const DIRECT_ATTEMPT: &str = "direct";

/// Body plus declared type of one successful fetch.
struct FetchedBody {
    bytes: Vec<u8>,
    content_type: Option<String>,
}

/// Ordered download fallback over a direct fetch and relays.
pub struct DownloadChain {
    http: Client,
    relays: Vec<Box<dyn Relay>>,
    attempt_timeout: Duration,
    max_bytes: Option<u64>,
}

impl DownloadChain {
    pub fn new(http: Client, attempt_timeout: Duration) -> Self {
        Self {
            http,
            relays: Vec::new(),
            attempt_timeout,
            max_bytes: None,
        }
    }

    /// Build the chain of template relays listed in the config.
    pub fn from_config(config: &AcquisitionConfig, http: &Client) -> Self {
        let mut chain = Self::new(http.clone(), config.attempt_timeout)
            .with_max_bytes(config.max_download_bytes);
        for template in &config.relay_templates {
            chain.add_relay(Box::new(RelayTemplate::new(template.clone())));
        }
        chain
    }

    pub fn add_relay(&mut self, relay: Box<dyn Relay>) {
        self.relays.push(relay);
    }

    pub fn with_relay(mut self, relay: Box<dyn Relay>) -> Self {
        self.add_relay(relay);
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: Option<u64>) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn relay_count(&self) -> usize {
        self.relays.len()
    }

    /// Fetch `url` and wrap the body as [`AcquiredMedia`].
    ///
    /// Indirect sources skip the direct attempt and get the generic
    /// filename. Direct sources are named after the URL's last path
    /// segment.
    pub async fn download(&self, url: &str, is_indirect: bool) -> MediaResult<AcquiredMedia> {
        let mut last_error = None;
        let mut attempts = 0;

        if !is_indirect {
            attempts += 1;
            match self.fetch(url, DIRECT_ATTEMPT).await {
                Ok(body) => return Ok(wrap(url, is_indirect, body)),
                Err(e) => {
                    info!(error = %e, "Direct fetch failed, falling back to relays");
                    last_error = Some(e);
                }
            }
        }

        for relay in &self.relays {
            attempts += 1;
            let proxied = relay.wrap(url);
            match self.fetch(&proxied, relay.name()).await {
                Ok(body) => return Ok(wrap(url, is_indirect, body)),
                Err(e) => last_error = Some(e),
            }
        }

        Err(MediaError::DownloadExhausted {
            attempts,
            last: Box::new(last_error.unwrap_or(MediaError::NoBackends("relay"))),
        })
    }

    /// One attempt; records metrics and logs under `label`.
    async fn fetch(&self, target: &str, label: &str) -> MediaResult<FetchedBody> {
        debug!(attempt = label, "Fetching media body");
        let result = self.fetch_body(target).await;

        match &result {
            Ok(body) => {
                record_relay_attempt(label, true);
                info!(attempt = label, bytes = body.bytes.len(), "Downloaded media body");
            }
            Err(e) => {
                record_relay_attempt(label, false);
                warn!(attempt = label, error = %e, "Download attempt failed");
            }
        }

        result
    }

    async fn fetch_body(&self, target: &str) -> MediaResult<FetchedBody> {
        let timeout_secs = self.attempt_timeout.as_secs();

        let mut response = self
            .http
            .get(target)
            .timeout(self.attempt_timeout)
            .send()
            .await
            .map_err(|e| MediaError::from_transport(e, timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::http_status(status.as_u16(), target));
        }

        if let (Some(limit), Some(declared)) = (self.max_bytes, response.content_length()) {
            if declared > limit {
                return Err(MediaError::resource_limit(format!(
                    "declared body of {declared} bytes exceeds limit of {limit}"
                )));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| MediaError::from_transport(e, timeout_secs))?
        {
            bytes.extend_from_slice(&chunk);
            if let Some(limit) = self.max_bytes {
                if bytes.len() as u64 > limit {
                    return Err(MediaError::resource_limit(format!(
                        "body exceeds limit of {limit} bytes"
                    )));
                }
            }
        }

        Ok(FetchedBody {
            bytes,
            content_type,
        })
    }
}

fn wrap(url: &str, is_indirect: bool, body: FetchedBody) -> AcquiredMedia {
    let filename = if is_indirect {
        INDIRECT_FILENAME.to_string()
    } else {
        filename_from_url(url)
    };
    AcquiredMedia::new(
        body.bytes,
        filename,
        normalize_mime(body.content_type.as_deref()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chain() -> DownloadChain {
        DownloadChain::new(Client::new(), Duration::from_secs(5))
    }

    fn relay(server: &MockServer, route: &str) -> Box<RelayTemplate> {
        Box::new(RelayTemplate::new(format!(
            "{}{}?url={{url}}",
            server.uri(),
            route
        )))
    }

    #[tokio::test]
    async fn test_direct_fast_path_skips_relays() {
        let origin = MockServer::start().await;
        let relays = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/media/talk.webm"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(b"webm-bytes".to_vec(), "video/webm"),
            )
            .expect(1)
            .mount(&origin)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"relay".to_vec()))
            .expect(0)
            .mount(&relays)
            .await;

        let url = format!("{}/media/talk.webm?token=abc", origin.uri());
        let media = chain()
            .with_relay(relay(&relays, "/r1"))
            .download(&url, false)
            .await
            .unwrap();

        assert_eq!(&media.bytes[..], b"webm-bytes");
        assert_eq!(media.filename, "talk.webm");
        assert_eq!(media.mime_type, "video/webm");
    }

    #[tokio::test]
    async fn test_relays_tried_in_order_after_direct_failure() {
        let origin = MockServer::start().await;
        let relays = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&origin)
            .await;
        Mock::given(path("/r1"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&relays)
            .await;
        Mock::given(path("/r2"))
            .and(query_param("url", format!("{}/clip.mp4", origin.uri())))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"payload".to_vec()))
            .expect(1)
            .mount(&relays)
            .await;
        Mock::given(path("/r3"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&relays)
            .await;

        let url = format!("{}/clip.mp4", origin.uri());
        let media = chain()
            .with_relay(relay(&relays, "/r1"))
            .with_relay(relay(&relays, "/r2"))
            .with_relay(relay(&relays, "/r3"))
            .download(&url, false)
            .await
            .unwrap();

        assert_eq!(&media.bytes[..], b"payload");
        assert_eq!(media.filename, "clip.mp4");
        // Relay answered with application/octet-stream
        assert_eq!(media.mime_type, "video/mp4");
    }

    #[tokio::test]
    async fn test_indirect_source_goes_straight_to_relays() {
        let origin = MockServer::start().await;
        let relays = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&origin)
            .await;
        Mock::given(path("/r1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"stream".to_vec(), "video/mp4; codecs=avc1"),
            )
            .expect(1)
            .mount(&relays)
            .await;

        let url = format!("{}/stream/x", origin.uri());
        let media = chain()
            .with_relay(relay(&relays, "/r1"))
            .download(&url, true)
            .await
            .unwrap();

        assert_eq!(media.filename, INDIRECT_FILENAME);
        assert_eq!(media.mime_type, "video/mp4");
    }

    #[tokio::test]
    async fn test_slow_relay_times_out_and_next_relay_wins() {
        let relays = MockServer::start().await;

        Mock::given(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"late".to_vec(), "video/mp4")
                    .set_delay(Duration::from_secs(3)),
            )
            .expect(1)
            .mount(&relays)
            .await;
        Mock::given(path("/fast"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"fast".to_vec(), "video/mp4"))
            .expect(1)
            .mount(&relays)
            .await;

        let started = std::time::Instant::now();
        let media = DownloadChain::new(Client::new(), Duration::from_millis(500))
            .with_relay(relay(&relays, "/slow"))
            .with_relay(relay(&relays, "/fast"))
            .download("https://cdn.example/x.mp4", true)
            .await
            .unwrap();

        assert_eq!(&media.bytes[..], b"fast");
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_timeout_is_reported_when_every_relay_stalls() {
        let relays = MockServer::start().await;
        Mock::given(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&relays)
            .await;

        let err = DownloadChain::new(Client::new(), Duration::from_millis(300))
            .with_relay(relay(&relays, "/slow"))
            .download("https://cdn.example/x.mp4", true)
            .await
            .unwrap_err();

        assert!(matches!(err.last_failure(), Some(MediaError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_exhaustion_reports_last_failure() {
        let relays = MockServer::start().await;
        Mock::given(path("/r1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&relays)
            .await;
        Mock::given(path("/r2"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&relays)
            .await;

        let err = chain()
            .with_relay(relay(&relays, "/r1"))
            .with_relay(relay(&relays, "/r2"))
            .download("https://cdn.example/x.mp4", true)
            .await
            .unwrap_err();

        match err {
            MediaError::DownloadExhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last, MediaError::HttpStatus { status: 429, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_byte_ceiling_fails_attempt() {
        let relays = MockServer::start().await;
        Mock::given(path("/r1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
            .mount(&relays)
            .await;

        let err = chain()
            .with_max_bytes(Some(16))
            .with_relay(relay(&relays, "/r1"))
            .download("https://cdn.example/x.mp4", true)
            .await
            .unwrap_err();

        assert!(matches!(
            err.last_failure(),
            Some(MediaError::ResourceLimit(_))
        ));
    }

    #[tokio::test]
    async fn test_no_relays_and_indirect_is_exhausted() {
        let err = chain()
            .download("https://cdn.example/x.mp4", true)
            .await
            .unwrap_err();
        assert!(matches!(err.last_failure(), Some(MediaError::NoBackends("relay"))));
    }
}
