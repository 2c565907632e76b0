//! Skip segments and the analysis payload that carries them.

use serde::{Deserialize, Deserializer, Serialize};

use crate::timestamp::parse_timestamp;

/// A half-open interval `[start, end)` to omit during playback.
///
/// Produced externally and treated as read-only. Lists of segments are not
/// required to be sorted or disjoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipSegment {
    /// Start in seconds
    #[serde(deserialize_with = "deserialize_seconds")]
    pub start: f64,

    /// End in seconds
    #[serde(deserialize_with = "deserialize_seconds")]
    pub end: f64,

    /// Free-text label ("silence", "filler", "repetition", ...)
    #[serde(default)]
    pub reason: String,
}

impl SkipSegment {
    pub fn new(start: f64, end: f64, reason: impl Into<String>) -> Self {
        Self {
            start,
            end,
            reason: reason.into(),
        }
    }

    /// Whether `position` falls inside `[start, end)`.
    ///
    /// Inverted or non-finite segments never contain anything.
    pub fn contains(&self, position: f64) -> bool {
        self.is_well_formed() && position >= self.start && position < self.end
    }

    /// Finite bounds with `start < end`.
    pub fn is_well_formed(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start < self.end
    }

    /// Length in seconds, zero for malformed segments.
    pub fn duration(&self) -> f64 {
        if self.is_well_formed() {
            self.end - self.start
        } else {
            0.0
        }
    }
}

/// Output of the analysis collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub segments: Vec<SkipSegment>,
}

/// Accept seconds as a JSON number or as a clock string ("01:02", "62.5").
fn deserialize_seconds<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => parse_timestamp(&s).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let seg = SkipSegment::new(5.0, 10.0, "silence");
        assert!(!seg.contains(4.999));
        assert!(seg.contains(5.0));
        assert!(seg.contains(9.999));
        assert!(!seg.contains(10.0));
    }

    #[test]
    fn test_inverted_segment_never_matches() {
        let seg = SkipSegment::new(10.0, 5.0, "corrupt");
        assert!(!seg.is_well_formed());
        assert!(!seg.contains(7.0));
        assert_eq!(seg.duration(), 0.0);
    }

    #[test]
    fn test_deserialize_numbers_and_clock_strings() {
        let json = r#"{
            "summary": "A talk about Rust.",
            "segments": [
                {"start": 1.5, "end": 4, "reason": "silence"},
                {"start": "00:01:00", "end": "01:05.5", "reason": "filler"},
                {"start": 9, "end": 12}
            ]
        }"#;

        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.summary, "A talk about Rust.");
        assert_eq!(result.segments.len(), 3);
        assert_eq!(result.segments[0], SkipSegment::new(1.5, 4.0, "silence"));
        assert_eq!(result.segments[1].start, 60.0);
        assert!((result.segments[1].end - 65.5).abs() < 1e-9);
        assert_eq!(result.segments[2].reason, "");
    }

    #[test]
    fn test_deserialize_rejects_garbage_bounds() {
        let json = r#"{"start": "soon", "end": 3, "reason": "x"}"#;
        assert!(serde_json::from_str::<SkipSegment>(json).is_err());
    }

    #[test]
    fn test_missing_fields_default() {
        let result: AnalysisResult = serde_json::from_str("{}").unwrap();
        assert!(result.summary.is_empty());
        assert!(result.segments.is_empty());
    }
}
