//! The analysis capability consumed by the rest of the system.

use async_trait::async_trait;

use tldw_media::ProgressSink;
use tldw_models::{AcquiredMedia, AnalysisResult};

use crate::error::AnalyzeResult;

/// Turns media bytes into a summary and a list of skippable segments.
#[async_trait]
pub trait MediaAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        media: &AcquiredMedia,
        progress: &dyn ProgressSink,
    ) -> AnalyzeResult<AnalysisResult>;
}
