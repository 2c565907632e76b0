//! Segment-skip state machine.
//!
//! Mode changes only on explicit toggles. Clock advances decide jumps.
//!
//! # Transitions
//!
//! ```text
//!                  Off        SkipOnly   Turbo
//! skip toggle      SkipOnly   Off        Off (base rate)
//! turbo toggle     Turbo      Turbo      Off (base rate)
//! ```
//!
//! Entering `Turbo` forces the turbo rate; `SkipOnly` leaves the rate alone.
//!
//! While the mode is not `Off`, every clock advance scans the segment list
//! in list order and jumps to the end of the first segment containing the
//! position. At most one jump happens per advance.

use std::time::Instant;

use tracing::debug;

use tldw_models::SkipSegment;

use crate::config::PlayerConfig;
use crate::state::{PlaybackMode, PlaybackState, SkipAction};

/// Decides jumps for one playback session.
#[derive(Debug, Clone)]
pub struct SkipEngine {
    config: PlayerConfig,
    segments: Vec<SkipSegment>,
    state: PlaybackState,
    playback_rate: f64,
    ack_deadline: Option<Instant>,
}

impl SkipEngine {
    pub fn new(config: PlayerConfig, segments: Vec<SkipSegment>) -> Self {
        let playback_rate = config.base_rate;
        Self {
            config,
            segments,
            state: PlaybackState::default(),
            playback_rate,
            ack_deadline: None,
        }
    }

    pub fn with_segments(segments: Vec<SkipSegment>) -> Self {
        Self::new(PlayerConfig::default(), segments)
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// State as of `now`, with an expired skip acknowledgement cleared.
    ///
    /// Lets a paused player drop the indicator without advancing the play
    /// head. Position and mode are untouched.
    pub fn state_at(&mut self, now: Instant) -> &PlaybackState {
        self.expire_ack(now);
        &self.state
    }

    pub fn mode(&self) -> PlaybackMode {
        self.state.mode
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    pub fn segments(&self) -> &[SkipSegment] {
        &self.segments
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// `Off` and `SkipOnly` swap. Leaving `Turbo` goes to `Off` and
    /// restores the base rate.
    pub fn toggle_skip(&mut self) -> PlaybackMode {
        self.state.mode = match self.state.mode {
            PlaybackMode::Off => PlaybackMode::SkipOnly,
            PlaybackMode::SkipOnly => PlaybackMode::Off,
            PlaybackMode::Turbo => {
                self.playback_rate = self.config.base_rate;
                PlaybackMode::Off
            }
        };
        debug!(mode = %self.state.mode, rate = self.playback_rate, "Skip toggled");
        self.state.mode
    }

    /// Any mode enters `Turbo` at the turbo rate; `Turbo` returns to `Off`
    /// at the base rate.
    pub fn toggle_turbo(&mut self) -> PlaybackMode {
        if self.state.mode == PlaybackMode::Turbo {
            self.state.mode = PlaybackMode::Off;
            self.playback_rate = self.config.base_rate;
        } else {
            self.state.mode = PlaybackMode::Turbo;
            self.playback_rate = self.config.turbo_rate;
        }
        debug!(mode = %self.state.mode, rate = self.playback_rate, "Turbo toggled");
        self.state.mode
    }

    /// Observe the play head at `position` seconds, `now` on the caller's
    /// clock.
    ///
    /// Returns the jump to perform, if any. The engine's own position
    /// follows the clock and then the jump target.
    pub fn tick(&mut self, position: f64, now: Instant) -> Option<SkipAction> {
        self.expire_ack(now);
        self.state.position = position;

        if !self.state.mode.is_skipping() {
            return None;
        }

        let segment = self.segments.iter().find(|s| s.contains(position))?;
        let action = SkipAction {
            from: position,
            to: segment.end,
            reason: segment.reason.clone(),
        };

        self.state.position = action.to;
        self.state.is_skip_active = true;
        self.state.active_reason = Some(action.reason.clone());
        self.ack_deadline = Some(now + self.config.ack_window);

        debug!(from = action.from, to = action.to, reason = %action.reason, "Skipping segment");
        Some(action)
    }

    /// Replace the segment list for a new media source. Resets the session.
    pub fn load(&mut self, segments: Vec<SkipSegment>) {
        self.segments = segments;
        self.reset();
    }

    /// Back to the initial state: `Off`, base rate, position zero.
    pub fn reset(&mut self) {
        self.state = PlaybackState::default();
        self.playback_rate = self.config.base_rate;
        self.ack_deadline = None;
    }

    fn expire_ack(&mut self, now: Instant) {
        if matches!(self.ack_deadline, Some(deadline) if now >= deadline) {
            self.state.is_skip_active = false;
            self.state.active_reason = None;
            self.ack_deadline = None;
        }
    }
}
