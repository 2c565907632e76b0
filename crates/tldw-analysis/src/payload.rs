//! Parsing of the model's JSON answer into an [`AnalysisResult`].

use serde::Deserialize;
use tracing::warn;

use tldw_models::{AnalysisResult, SkipSegment};

use crate::error::{AnalysisError, AnalyzeResult};

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    segments: Option<Vec<serde_json::Value>>,
}

/// Remove a surrounding markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// Parse model output into an analysis payload.
///
/// Segments whose bounds cannot be read are dropped with a warning. The
/// remaining ones keep their order and are not otherwise validated.
pub fn parse_analysis(text: &str) -> AnalyzeResult<AnalysisResult> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(AnalysisError::analysis_failed("model returned no text"));
    }

    let raw: RawAnalysis = serde_json::from_str(body)
        .map_err(|e| AnalysisError::analysis_failed(format!("unusable analysis payload: {e}")))?;

    if raw.summary.is_none() && raw.segments.is_none() {
        return Err(AnalysisError::analysis_failed(
            "payload has neither summary nor segments",
        ));
    }

    let segments = raw
        .segments
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<SkipSegment>(value) {
            Ok(segment) => Some(segment),
            Err(e) => {
                warn!(index, error = %e, "Dropping unreadable segment");
                None
            }
        })
        .collect();

    Ok(AnalysisResult {
        summary: raw.summary.unwrap_or_default(),
        segments,
    })
}
