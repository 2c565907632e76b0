//! Analysis error types.

use thiserror::Error;

/// Result type for analysis operations.
///
/// Named apart from [`tldw_models::AnalysisResult`], which is the payload.
pub type AnalyzeResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Uploaded media was still processing after {polls} polls")]
    ProcessingTimeout { polls: u32 },

    #[error("Uploaded media entered state {state}")]
    ProcessingFailed { state: String },

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn analysis_failed(msg: impl Into<String>) -> Self {
        Self::AnalysisFailed(msg.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// True when the uploaded file never became usable.
    pub fn is_processing_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::ProcessingTimeout { .. } | AnalysisError::ProcessingFailed { .. }
        )
    }
}
