//! Thread-safe handle around a [`SkipEngine`].

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use tldw_models::SkipSegment;

use crate::engine::SkipEngine;
use crate::state::{PlaybackMode, PlaybackState, SkipAction};

/// Shared playback session.
///
/// Every toggle and clock advance takes the lock once, so toggles and ticks
/// coming from different tasks are applied one at a time.
#[derive(Debug, Clone)]
pub struct SharedSession {
    engine: Arc<Mutex<SkipEngine>>,
}

impl SharedSession {
    pub fn new(engine: SkipEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    pub async fn tick(&self, position: f64, now: Instant) -> Option<SkipAction> {
        self.engine.lock().await.tick(position, now)
    }

    pub async fn toggle_skip(&self) -> PlaybackMode {
        self.engine.lock().await.toggle_skip()
    }

    pub async fn toggle_turbo(&self) -> PlaybackMode {
        self.engine.lock().await.toggle_turbo()
    }

    pub async fn load(&self, segments: Vec<SkipSegment>) {
        self.engine.lock().await.load(segments);
    }

    pub async fn reset(&self) {
        self.engine.lock().await.reset();
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> PlaybackState {
        self.engine.lock().await.state().clone()
    }

    /// Copy of the state as of `now`; see [`SkipEngine::state_at`].
    pub async fn snapshot_at(&self, now: Instant) -> PlaybackState {
        self.engine.lock().await.state_at(now).clone()
    }

    pub async fn playback_rate(&self) -> f64 {
        self.engine.lock().await.playback_rate()
    }
}
