//! Shared data models for tldw.
//!
//! This crate provides Serde-serializable types for:
//! - Media references, their classification and link normalization
//! - Acquired media blobs and filename/MIME derivation
//! - Skip segments and analysis payloads
//! - Timestamp parsing for segment bounds

pub mod link;
pub mod media;
pub mod segment;
pub mod timestamp;
pub mod utils;

// Re-export common types
pub use link::{classify, normalize, CanonicalLink, MediaReference, ReferenceKind};
pub use media::{
    filename_from_url, normalize_mime, AcquiredMedia, FALLBACK_FILENAME, FALLBACK_MIME_TYPE,
    INDIRECT_FILENAME,
};
pub use segment::{AnalysisResult, SkipSegment};
pub use timestamp::{format_seconds, parse_timestamp, TimestampError};
pub use utils::{extract_video_id, is_video_sharing_host, VideoIdError, VideoIdResult};
