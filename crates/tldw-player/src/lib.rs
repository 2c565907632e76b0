//! Segment-skip playback engine.
//!
//! Consumes a playback clock and a list of [`tldw_models::SkipSegment`]s
//! and decides when to jump the play head, in which mode and at which rate.

pub mod config;
pub mod engine;
pub mod error;
pub mod session;
pub mod simulate;
pub mod state;
pub mod stats;

pub use config::PlayerConfig;
pub use engine::SkipEngine;
pub use error::{PlayerError, PlayerResult};
pub use session::SharedSession;
pub use simulate::{simulate, SimulationReport};
pub use state::{PlaybackMode, PlaybackState, SkipAction};
pub use stats::SkipStats;
