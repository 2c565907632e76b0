//! Drive a [`SkipEngine`] over a synthetic clock.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use crate::engine::SkipEngine;
use crate::error::{PlayerError, PlayerResult};
use crate::state::{PlaybackMode, SkipAction};

/// Outcome of a simulated playback.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub mode: PlaybackMode,
    /// Media duration in seconds
    pub duration: f64,
    /// Viewer time spent to reach the end
    pub wall_seconds: f64,
    pub jumps: Vec<SkipAction>,
}

impl SimulationReport {
    /// Viewer seconds saved compared to plain playback.
    pub fn time_saved(&self) -> f64 {
        (self.duration - self.wall_seconds).max(0.0)
    }

    /// Media seconds jumped over.
    pub fn skipped_media(&self) -> f64 {
        self.jumps.iter().map(SkipAction::skipped).sum()
    }
}

/// Play from zero to `duration`, ticking every `step` viewer seconds.
///
/// Media time advances by `step * rate` per tick. The engine keeps its
/// current mode; callers toggle it beforehand.
pub fn simulate(engine: &mut SkipEngine, duration: f64, step: f64) -> PlayerResult<SimulationReport> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(PlayerError::invalid_parameter(format!(
            "duration must be a non-negative number, got {duration}"
        )));
    }
    if !step.is_finite() || step <= 0.0 {
        return Err(PlayerError::invalid_parameter(format!(
            "step must be positive, got {step}"
        )));
    }
    let rate = engine.playback_rate();
    if !rate.is_finite() || rate <= 0.0 {
        return Err(PlayerError::invalid_parameter(format!(
            "playback rate must be positive, got {rate}"
        )));
    }

    let origin = Instant::now();
    let mut position = 0.0;
    let mut wall = 0.0;
    let mut jumps = Vec::new();

    while position < duration {
        let now = origin + Duration::from_secs_f64(wall);
        if let Some(action) = engine.tick(position, now) {
            position = action.to;
            jumps.push(action);
            if position >= duration {
                break;
            }
        }

        let advance = step * rate;
        if position + advance >= duration {
            wall += (duration - position) / rate;
            position = duration;
        } else {
            wall += step;
            position += advance;
        }
    }

    info!(
        mode = %engine.mode(),
        duration,
        wall_seconds = wall,
        jumps = jumps.len(),
        "Simulation finished"
    );

    Ok(SimulationReport {
        mode: engine.mode(),
        duration,
        wall_seconds: wall,
        jumps,
    })
}
