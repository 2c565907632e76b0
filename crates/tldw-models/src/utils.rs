//! Host detection and video-identifier extraction for video-sharing links.
//!
//! These helpers work on raw strings so they never fail on malformed
//! input; callers decide what to do when nothing is recognized.

/// Host substrings that mark a reference as a video-sharing link.
pub const VIDEO_SHARING_HOSTS: [&str; 2] = ["youtube.com", "youtu.be"];

/// Errors that can occur during video ID extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VideoIdError {
    /// URL is not on a video-sharing host
    #[error("URL is not a video-sharing link")]
    NotVideoSharingHost,
    /// Video ID has invalid characters or is empty
    #[error("Video ID has invalid format")]
    InvalidVideoId,
    /// No known link shape matched
    #[error("Video ID not found in URL")]
    VideoIdNotFound,
}

/// Result type for video ID extraction.
pub type VideoIdResult<T> = Result<T, VideoIdError>;

/// Check if a URL points at a video-sharing host (case-insensitive).
pub fn is_video_sharing_host(url: &str) -> bool {
    let url = url.to_ascii_lowercase();
    VIDEO_SHARING_HOSTS.iter().any(|host| url.contains(host))
}

/// Extract the video identifier from a video-sharing link.
///
/// Supported shapes:
/// - `https://youtube.com/watch?v=VIDEO_ID` (any host variant, `v` in any position)
/// - `https://youtu.be/VIDEO_ID`
/// - `https://youtube.com/shorts/VIDEO_ID`
/// - `https://youtube.com/embed/VIDEO_ID`
/// - `https://youtube.com/v/VIDEO_ID`
///
/// The identifier must be non-empty and contain only `[A-Za-z0-9_-]`.
/// Length is not enforced; resolver backends reject unknown ids themselves.
pub fn extract_video_id(url: &str) -> VideoIdResult<String> {
    let url = url.trim();

    if !is_video_sharing_host(url) {
        return Err(VideoIdError::NotVideoSharingHost);
    }

    let lower = url.to_ascii_lowercase();

    let strategies: [fn(&str, &str) -> Option<String>; 5] = [
        extract_from_watch_url,
        extract_from_short_url,
        extract_from_shorts_url,
        extract_from_embed_url,
        extract_from_v_url,
    ];

    for strategy in strategies {
        if let Some(id) = strategy(url, &lower) {
            return validate_video_id(id);
        }
    }

    Err(VideoIdError::VideoIdNotFound)
}

/// `watch?v=VIDEO_ID` or `...&v=VIDEO_ID`
fn extract_from_watch_url(url: &str, lower: &str) -> Option<String> {
    let pos = lower.find("?v=").or_else(|| lower.find("&v="))?;
    extract_id_from_segment(&url[pos + 3..])
}

/// `youtu.be/VIDEO_ID`
fn extract_from_short_url(url: &str, lower: &str) -> Option<String> {
    after_marker(url, lower, "youtu.be/")
}

/// `/shorts/VIDEO_ID`
fn extract_from_shorts_url(url: &str, lower: &str) -> Option<String> {
    after_marker(url, lower, "/shorts/")
}

/// `/embed/VIDEO_ID`
fn extract_from_embed_url(url: &str, lower: &str) -> Option<String> {
    after_marker(url, lower, "/embed/")
}

/// `/v/VIDEO_ID`
fn extract_from_v_url(url: &str, lower: &str) -> Option<String> {
    after_marker(url, lower, "/v/")
}

fn after_marker(url: &str, lower: &str, marker: &str) -> Option<String> {
    let start = lower.find(marker)? + marker.len();
    if start >= url.len() {
        return None;
    }
    extract_id_from_segment(&url[start..])
}

/// Take everything up to the next delimiter.
fn extract_id_from_segment(segment: &str) -> Option<String> {
    let delimiters = ['&', '#', '?', '/'];
    let end = segment
        .find(|c| delimiters.contains(&c))
        .unwrap_or(segment.len());
    Some(segment[..end].trim().to_string())
}

fn validate_video_id(id: String) -> VideoIdResult<String> {
    if id.is_empty() {
        return Err(VideoIdError::InvalidVideoId);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(VideoIdError::InvalidVideoId);
    }

    Ok(id)
}
