//! Media reference classification and link normalization.
//!
//! A user-supplied reference is either a direct media URL or a link to a
//! video-sharing page. Video-sharing links are rewritten into a single
//! canonical watch-URL shape so every resolver backend sees uniform input.

use serde::{Deserialize, Serialize};

use crate::utils::{extract_video_id, is_video_sharing_host};

/// Canonical watch-URL prefix every recognized link is rebuilt into.
pub const CANONICAL_WATCH_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// How a reference must be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Link to a video-sharing page; needs resolution before download.
    Indirect,
    /// Direct link to a media file.
    Direct,
}

impl ReferenceKind {
    pub fn is_indirect(&self) -> bool {
        matches!(self, Self::Indirect)
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Indirect => write!(f, "indirect"),
            ReferenceKind::Direct => write!(f, "direct"),
        }
    }
}

/// A user-supplied media reference. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaReference(String);

impl MediaReference {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify by host substring.
    pub fn kind(&self) -> ReferenceKind {
        classify(&self.0)
    }
}

impl std::fmt::Display for MediaReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized form of a reference.
///
/// When the link shape was recognized, `video_id` is set and `url` is the
/// canonical watch URL. Otherwise `url` is the input unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalLink {
    pub url: String,
    pub video_id: Option<String>,
}

impl CanonicalLink {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Whether the input was recognized and rewritten.
    pub fn is_recognized(&self) -> bool {
        self.video_id.is_some()
    }
}

impl std::fmt::Display for CanonicalLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// Classify a raw reference as indirect (video-sharing) or direct.
pub fn classify(reference: &str) -> ReferenceKind {
    if is_video_sharing_host(reference) {
        ReferenceKind::Indirect
    } else {
        ReferenceKind::Direct
    }
}

/// Canonicalize a video-sharing link.
///
/// Never fails: any shape that cannot be parsed comes back unchanged.
/// `normalize(normalize(x).as_str()) == normalize(x)` for every input.
///
/// # Example
/// ```
/// use tldw_models::link::normalize;
///
/// let link = normalize("https://youtu.be/abc123");
/// assert_eq!(link.as_str(), "https://www.youtube.com/watch?v=abc123");
/// ```
pub fn normalize(reference: &str) -> CanonicalLink {
    match extract_video_id(reference) {
        Ok(id) => CanonicalLink {
            url: format!("{}{}", CANONICAL_WATCH_PREFIX, id),
            video_id: Some(id),
        },
        Err(_) => CanonicalLink {
            url: reference.to_string(),
            video_id: None,
        },
    }
}
