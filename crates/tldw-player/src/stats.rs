//! Aggregate numbers for a segment list.

use serde::Serialize;

use tldw_models::SkipSegment;

/// How much of a video a segment list removes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkipStats {
    /// Media duration in seconds
    pub duration: f64,
    /// Union of all well-formed segments clipped to `[0, duration]`
    pub skippable: f64,
    /// Segments that contributed to the union
    pub segments_used: usize,
}

impl SkipStats {
    pub fn compute(segments: &[SkipSegment], duration: f64) -> Self {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };

        let mut spans: Vec<(f64, f64)> = segments
            .iter()
            .filter(|s| s.is_well_formed())
            .map(|s| (s.start.max(0.0), s.end.min(duration)))
            .filter(|(start, end)| start < end)
            .collect();
        let segments_used = spans.len();

        spans.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut skippable = 0.0;
        let mut current: Option<(f64, f64)> = None;
        for (start, end) in spans {
            match current {
                Some((cur_start, cur_end)) if start <= cur_end => {
                    current = Some((cur_start, cur_end.max(end)));
                }
                Some((cur_start, cur_end)) => {
                    skippable += cur_end - cur_start;
                    current = Some((start, end));
                }
                None => current = Some((start, end)),
            }
        }
        if let Some((start, end)) = current {
            skippable += end - start;
        }

        Self {
            duration,
            skippable,
            segments_used,
        }
    }

    /// Duration left after every skippable second is removed.
    pub fn condensed_duration(&self) -> f64 {
        (self.duration - self.skippable).max(0.0)
    }

    /// Fraction of the media that is skippable, 0.0 to 1.0.
    pub fn skippable_ratio(&self) -> f64 {
        if self.duration > 0.0 {
            self.skippable / self.duration
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_of_overlapping_segments() {
        let segments = vec![
            SkipSegment::new(0.0, 10.0, "A"),
            SkipSegment::new(5.0, 15.0, "B"),
            SkipSegment::new(30.0, 40.0, "C"),
        ];
        let stats = SkipStats::compute(&segments, 100.0);
        assert_eq!(stats.skippable, 25.0);
        assert_eq!(stats.condensed_duration(), 75.0);
        assert_eq!(stats.segments_used, 3);
    }

    #[test]
    fn test_clips_to_duration_and_ignores_malformed() {
        let segments = vec![
            SkipSegment::new(-5.0, 2.0, "pre"),
            SkipSegment::new(50.0, 80.0, "tail"),
            SkipSegment::new(9.0, 3.0, "inverted"),
            SkipSegment::new(f64::NAN, 3.0, "nan"),
            SkipSegment::new(70.0, 90.0, "past end"),
        ];
        let stats = SkipStats::compute(&segments, 60.0);
        assert_eq!(stats.skippable, 12.0);
        assert_eq!(stats.segments_used, 2);
        assert!((stats.skippable_ratio() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_empty() {
        let stats = SkipStats::compute(&[], 0.0);
        assert_eq!(stats.skippable, 0.0);
        assert_eq!(stats.skippable_ratio(), 0.0);
    }
}
