//! Gemini client that finds skippable segments in a media blob.
//!
//! Small media travels inline as base64. Larger media goes through the
//! resumable upload endpoint, after which the file handle is polled until
//! the service reports it `ACTIVE`. The generation call is retried across
//! the configured models in order.

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn, Instrument};

use tldw_media::ProgressSink;
use tldw_models::{AcquiredMedia, AnalysisResult};

use crate::analyzer::MediaAnalyzer;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalyzeResult};
use crate::payload::parse_analysis;

pub const UPLOADING: &str = "Uploading...";
pub const PROCESSING: &str = "Processing...";
pub const ANALYZING: &str = "Analyzing...";

const STATE_ACTIVE: &str = "ACTIVE";
const STATE_PROCESSING: &str = "PROCESSING";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    File {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct UploadStartRequest<'a> {
    file: UploadMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct UploadMetadata<'a> {
    display_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: FileHandle,
}

/// Server-side handle for uploaded media.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

// =============================================================================
// Client
// =============================================================================

/// Gemini-backed [`MediaAnalyzer`].
pub struct GeminiAnalyzer {
    config: AnalysisConfig,
    client: Client,
}

impl GeminiAnalyzer {
    pub fn new(config: AnalysisConfig) -> AnalyzeResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("tldw/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }

    /// Create an analyzer from environment variables.
    pub fn from_env() -> AnalyzeResult<Self> {
        Self::new(AnalysisConfig::from_env()?)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Build the media part, uploading when the blob is over the inline limit.
    async fn media_part(
        &self,
        media: &AcquiredMedia,
        progress: &dyn ProgressSink,
    ) -> AnalyzeResult<Part> {
        if media.len() as u64 <= self.config.inline_limit_bytes {
            debug!(bytes = media.len(), "Sending media inline");
            return Ok(Part::Inline {
                inline_data: InlineData {
                    mime_type: media.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&media.bytes),
                },
            });
        }

        progress.report(UPLOADING);
        let file = self.upload(media).await?;

        let file = if file.state.as_deref() == Some(STATE_ACTIVE) {
            file
        } else {
            progress.report(PROCESSING);
            self.wait_until_active(file).await?
        };

        Ok(Part::File {
            file_data: FileData {
                mime_type: file.mime_type.unwrap_or_else(|| media.mime_type.clone()),
                file_uri: file.uri,
            },
        })
    }

    /// Resumable upload: start a session, then send the bytes and finalize.
    pub async fn upload(&self, media: &AcquiredMedia) -> AnalyzeResult<FileHandle> {
        info!(bytes = media.len(), filename = %media.filename, "Uploading media");

        let start = self
            .client
            .post(format!("{}/upload/v1beta/files", self.base_url()))
            .query(&[("key", &self.config.api_key)])
            .timeout(self.config.request_timeout)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", media.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", media.mime_type.as_str())
            .json(&UploadStartRequest {
                file: UploadMetadata {
                    display_name: &media.filename,
                },
            })
            .send()
            .await?;
        let start = ensure_success(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| AnalysisError::upload_failed("no upload URL in start response"))?;

        let finish = self
            .client
            .post(&upload_url)
            .timeout(self.config.request_timeout)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(media.bytes.clone())
            .send()
            .await?;
        let finish = ensure_success(finish).await?;

        let uploaded: UploadResponse = serde_json::from_slice(&finish.bytes().await?)?;
        info!(file = %uploaded.file.name, state = ?uploaded.file.state, "Upload finalized");
        Ok(uploaded.file)
    }

    /// Fetch the current state of an uploaded file.
    pub async fn get_file(&self, name: &str) -> AnalyzeResult<FileHandle> {
        let response = self
            .client
            .get(format!("{}/v1beta/{}", self.base_url(), name))
            .query(&[("key", &self.config.api_key)])
            .timeout(self.config.request_timeout)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }

    /// Poll until the file is `ACTIVE`.
    ///
    /// `PROCESSING` (or a missing state) keeps polling; any other state
    /// fails immediately.
    async fn wait_until_active(&self, mut file: FileHandle) -> AnalyzeResult<FileHandle> {
        let mut polls = 0;

        loop {
            match file.state.as_deref() {
                Some(STATE_ACTIVE) => {
                    info!(file = %file.name, polls, "Uploaded media is active");
                    return Ok(file);
                }
                Some(STATE_PROCESSING) | None => {}
                Some(other) => {
                    return Err(AnalysisError::ProcessingFailed {
                        state: other.to_string(),
                    })
                }
            }

            if polls >= self.config.max_polls {
                return Err(AnalysisError::ProcessingTimeout { polls });
            }

            tokio::time::sleep(self.config.poll_interval).await;
            polls += 1;
            debug!(file = %file.name, polls, "Polling file state");
            file = self.get_file(&file.name).await?;
        }
    }

    async fn generate(&self, model: &str, parts: &[Part]) -> AnalyzeResult<AnalysisResult> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: parts.to_vec(),
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url(),
                model
            ))
            .query(&[("key", &self.config.api_key)])
            .timeout(self.config.request_timeout)
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let body: GenerateResponse = serde_json::from_slice(&response.bytes().await?)
            .map_err(|e| AnalysisError::analysis_failed(format!("unreadable response: {e}")))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        parse_analysis(&text)
    }
}

#[async_trait]
impl MediaAnalyzer for GeminiAnalyzer {
    async fn analyze(
        &self,
        media: &AcquiredMedia,
        progress: &dyn ProgressSink,
    ) -> AnalyzeResult<AnalysisResult> {
        let span = info_span!("analyze", filename = %media.filename, bytes = media.len());

        async move {
            if self.config.models.is_empty() {
                return Err(AnalysisError::config("no models configured"));
            }

            let media_part = self.media_part(media, progress).await?;
            let parts = vec![media_part, Part::Text { text: build_prompt() }];

            progress.report(ANALYZING);

            let mut last_error = None;
            for model in &self.config.models {
                info!(model = %model, "Requesting analysis");
                match self.generate(model, &parts).await {
                    Ok(result) => {
                        info!(
                            model = %model,
                            segments = result.segments.len(),
                            "Analysis complete"
                        );
                        return Ok(result);
                    }
                    Err(e) => {
                        warn!(model = %model, error = %e, "Model failed");
                        last_error = Some(e);
                    }
                }
            }

            Err(last_error.unwrap_or_else(|| AnalysisError::analysis_failed("all models failed")))
        }
        .instrument(span)
        .await
    }
}

/// Turn a non-2xx response into [`AnalysisError::HttpStatus`].
async fn ensure_success(response: Response) -> AnalyzeResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AnalysisError::http_status(status.as_u16(), body))
}

fn build_prompt() -> String {
    r#"You are helping a viewer watch a condensed version of this video.

Identify intervals that can be skipped without losing content: silence,
filler talk, repetition, long pauses, off-topic tangents and dead air.
Also write a short summary of what the video covers.

Return ONLY a single JSON object with this schema:
{
  "summary": "Two or three sentences",
  "segments": [
    { "start": 12.5, "end": 20.0, "reason": "silence" }
  ]
}

Rules:
- "start" and "end" are seconds from the beginning of the video.
- Every segment must have start < end.
- Use a short lowercase reason such as "silence", "filler" or "repetition".
- Return an empty "segments" array if nothing should be skipped.
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tldw_media::RecordingProgress;
    use tldw_models::SkipSegment;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn analyzer(server: &MockServer, models: &[&str]) -> GeminiAnalyzer {
        let config = AnalysisConfig::new("test-key")
            .with_base_url(server.uri())
            .with_models(models.iter().copied())
            .with_inline_limit(1024)
            .with_polling(Duration::from_millis(5), 3);
        GeminiAnalyzer::new(config).unwrap()
    }

    fn generation(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        })
    }

    fn small_media() -> AcquiredMedia {
        AcquiredMedia::new(b"tiny".to_vec(), "clip.mp4", "video/mp4")
    }

    fn large_media() -> AcquiredMedia {
        AcquiredMedia::new(vec![7u8; 2048], "talk.webm", "video/webm")
    }

    async fn mount_upload(server: &MockServer, state: &str) {
        let session_url = format!("{}/upload-session/1", server.uri());
        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .and(query_param("key", "test-key"))
            .and(header("X-Goog-Upload-Command", "start"))
            .and(header("X-Goog-Upload-Header-Content-Length", "2048"))
            .respond_with(
                ResponseTemplate::new(200).insert_header(UPLOAD_URL_HEADER, session_url.as_str()),
            )
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload-session/1"))
            .and(header("X-Goog-Upload-Offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "file": {
                    "name": "files/abc",
                    "uri": "https://files.example/abc",
                    "state": state,
                    "mimeType": "video/webm"
                }
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_inline_analysis() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/model-a:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_string_contains("inlineData"))
            .respond_with(ResponseTemplate::new(200).set_body_json(generation(
                "```json\n{\"summary\": \"s\", \"segments\": [{\"start\": 1, \"end\": 3, \"reason\": \"silence\"}]}\n```",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let progress = RecordingProgress::new();
        let result = analyzer(&server, &["model-a"])
            .analyze(&small_media(), &progress)
            .await
            .unwrap();

        assert_eq!(result.summary, "s");
        assert_eq!(result.segments, vec![SkipSegment::new(1.0, 3.0, "silence")]);
        assert_eq!(progress.events(), vec![ANALYZING]);
    }

    #[tokio::test]
    async fn test_model_fallback_uses_next_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/model-a:generateContent"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/model-b:generateContent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(generation(r#"{"summary": "ok", "segments": []}"#)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = analyzer(&server, &["model-a", "model-b"])
            .analyze(&small_media(), &RecordingProgress::new())
            .await
            .unwrap();
        assert_eq!(result.summary, "ok");
    }

    #[tokio::test]
    async fn test_all_models_fail_reports_last_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/model-a:generateContent"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/model-b:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let err = analyzer(&server, &["model-a", "model-b"])
            .analyze(&small_media(), &RecordingProgress::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::AnalysisFailed(_)));
    }

    #[tokio::test]
    async fn test_upload_path_polls_until_active() {
        let server = MockServer::start().await;
        mount_upload(&server, "PROCESSING").await;

        Mock::given(method("GET"))
            .and(path("/v1beta/files/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "files/abc",
                "uri": "https://files.example/abc",
                "state": "PROCESSING"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1beta/files/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "files/abc",
                "uri": "https://files.example/abc",
                "state": "ACTIVE"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/model-a:generateContent"))
            .and(body_string_contains("https://files.example/abc"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(generation(r#"{"summary": "big", "segments": []}"#)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let progress = RecordingProgress::new();
        let result = analyzer(&server, &["model-a"])
            .analyze(&large_media(), &progress)
            .await
            .unwrap();

        assert_eq!(result.summary, "big");
        assert_eq!(progress.events(), vec![UPLOADING, PROCESSING, ANALYZING]);
    }

    #[tokio::test]
    async fn test_upload_processing_timeout() {
        let server = MockServer::start().await;
        mount_upload(&server, "PROCESSING").await;
        Mock::given(method("GET"))
            .and(path("/v1beta/files/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "files/abc",
                "state": "PROCESSING"
            })))
            .expect(3)
            .mount(&server)
            .await;

        let err = analyzer(&server, &["model-a"])
            .analyze(&large_media(), &RecordingProgress::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ProcessingTimeout { polls: 3 }));
    }

    #[tokio::test]
    async fn test_upload_failed_state() {
        let server = MockServer::start().await;
        mount_upload(&server, "FAILED").await;

        let err = analyzer(&server, &["model-a"])
            .analyze(&large_media(), &RecordingProgress::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ProcessingFailed { ref state } if state == "FAILED"));
        assert!(err.is_processing_error());
    }

    #[tokio::test]
    async fn test_stalled_poll_hits_request_timeout() {
        let server = MockServer::start().await;
        mount_upload(&server, "PROCESSING").await;
        Mock::given(method("GET"))
            .and(path("/v1beta/files/abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"name": "files/abc", "state": "ACTIVE"}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = AnalysisConfig::new("test-key")
            .with_base_url(server.uri())
            .with_models(["model-a"])
            .with_inline_limit(1024)
            .with_polling(Duration::from_millis(5), 3)
            .with_request_timeout(Duration::from_millis(300));
        let started = std::time::Instant::now();
        let err = GeminiAnalyzer::new(config)
            .unwrap()
            .analyze(&large_media(), &RecordingProgress::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Network(ref e) if e.is_timeout()));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_stalled_upload_start_hits_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .expect(1)
            .mount(&server)
            .await;

        let config = AnalysisConfig::new("test-key")
            .with_base_url(server.uri())
            .with_models(["model-a"])
            .with_inline_limit(1024)
            .with_request_timeout(Duration::from_millis(300));
        let err = GeminiAnalyzer::new(config)
            .unwrap()
            .upload(&large_media())
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Network(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn test_no_models_is_config_error() {
        let server = MockServer::start().await;
        let err = analyzer(&server, &[])
            .analyze(&small_media(), &RecordingProgress::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }
}
