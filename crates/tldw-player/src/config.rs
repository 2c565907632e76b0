//! Playback engine configuration.

use std::time::Duration;

/// Rates and timings for [`crate::SkipEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// Rate outside turbo mode
    pub base_rate: f64,
    /// Rate forced while turbo mode is on
    pub turbo_rate: f64,
    /// How long a jump stays flagged as active
    pub ack_window: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_rate: 1.0,
            turbo_rate: 2.0,
            ack_window: Duration::from_millis(800),
        }
    }
}
