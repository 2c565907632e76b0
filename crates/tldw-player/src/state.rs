//! Observable playback state.

use serde::{Deserialize, Serialize};

/// Skip mode selected by the viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Plain playback, segments ignored
    #[default]
    Off,
    /// Segments skipped at the current rate
    SkipOnly,
    /// Segments skipped at the turbo rate
    Turbo,
}

impl PlaybackMode {
    /// Whether segments are skipped in this mode.
    pub fn is_skipping(&self) -> bool {
        !matches!(self, PlaybackMode::Off)
    }
}

impl std::fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackMode::Off => write!(f, "off"),
            PlaybackMode::SkipOnly => write!(f, "skip_only"),
            PlaybackMode::Turbo => write!(f, "turbo"),
        }
    }
}

/// State of one playback session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Play head in seconds
    pub position: f64,
    /// True for a short window after a jump
    pub is_skip_active: bool,
    /// Reason of the most recent jump while it is active
    pub active_reason: Option<String>,
    pub mode: PlaybackMode,
}

/// One jump decided by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipAction {
    pub from: f64,
    pub to: f64,
    pub reason: String,
}

impl SkipAction {
    /// Media seconds skipped by this jump.
    pub fn skipped(&self) -> f64 {
        (self.to - self.from).max(0.0)
    }
}
