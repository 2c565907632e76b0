//! Client for the content-analysis service.
//!
//! Sends acquired media to a Gemini-style generative API and parses the
//! `{summary, segments}` payload it returns.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod gemini;
pub mod payload;

pub use analyzer::MediaAnalyzer;
pub use config::{AnalysisConfig, DEFAULT_BASE_URL, DEFAULT_MODELS};
pub use error::{AnalysisError, AnalyzeResult};
pub use gemini::{FileHandle, GeminiAnalyzer, ANALYZING, PROCESSING, UPLOADING};
pub use payload::{parse_analysis, strip_code_fence};
