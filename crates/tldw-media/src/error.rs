//! Error types for media acquisition.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while resolving or downloading media.
///
/// Per-backend variants describe a single failed attempt. The chains fold
/// those into [`MediaError::ResolutionExhausted`] or
/// [`MediaError::DownloadExhausted`] once every backend has been tried.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("All {attempts} resolver backends failed; last error: {last}")]
    ResolutionExhausted {
        attempts: usize,
        #[source]
        last: Box<MediaError>,
    },

    #[error("All {attempts} download attempts failed; last error: {last}")]
    DownloadExhausted {
        attempts: usize,
        #[source]
        last: Box<MediaError>,
    },

    #[error("No {0} backends configured")]
    NoBackends(&'static str),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Expected {expected} response, got {found}")]
    UnexpectedContentType { expected: String, found: String },

    #[error("Resolver rejected the link: {0}")]
    ResolverRejected(String),

    #[error("Resolver offered no video candidate")]
    NoVideoCandidate,

    #[error("Unrecognized resolver status: {0}")]
    UnrecognizedStatus(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Resource limit exceeded: {0}")]
    ResourceLimit(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create an HTTP status error.
    pub fn http_status(status: u16, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    /// Create an unexpected content type error.
    pub fn unexpected_content_type(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedContentType {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Create a resource limit error.
    pub fn resource_limit(message: impl Into<String>) -> Self {
        Self::ResourceLimit(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Map a transport error, turning reqwest timeouts into [`MediaError::Timeout`].
    pub fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_secs)
        } else {
            Self::Network(err)
        }
    }

    /// True for the terminal errors produced by an exhausted chain.
    pub fn is_exhausted(&self) -> bool {
        matches!(
            self,
            MediaError::ResolutionExhausted { .. } | MediaError::DownloadExhausted { .. }
        )
    }

    /// The last per-backend failure carried by an exhausted chain.
    pub fn last_failure(&self) -> Option<&MediaError> {
        match self {
            MediaError::ResolutionExhausted { last, .. }
            | MediaError::DownloadExhausted { last, .. } => Some(last),
            _ => None,
        }
    }
}
