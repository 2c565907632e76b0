//! Acquired media blob.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Filename given to media acquired through a video-sharing link.
pub const INDIRECT_FILENAME: &str = "youtube_video.mp4";

/// Filename used when a direct URL has no usable last path segment.
pub const FALLBACK_FILENAME: &str = "video.mp4";

/// MIME type used when the source declares none.
pub const FALLBACK_MIME_TYPE: &str = "video/mp4";

/// MIME types that say nothing about the media and count as undeclared.
const OPAQUE_MIME_TYPES: [&str; 2] = ["application/octet-stream", "binary/octet-stream"];

/// Bytes produced by a successful acquisition. Owned by the caller.
///
/// The body is reference-counted so uploads can hand it to the HTTP
/// client without copying.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquiredMedia {
    #[serde(skip)]
    pub bytes: Bytes,
    pub filename: String,
    pub mime_type: String,
}

impl AcquiredMedia {
    pub fn new(
        bytes: impl Into<Bytes>,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Blobs can be hundreds of megabytes; print the size instead.
impl std::fmt::Debug for AcquiredMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquiredMedia")
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Derive a filename from a direct media URL.
///
/// Takes the last path segment with query and fragment stripped, falling
/// back to [`FALLBACK_FILENAME`] when that segment is empty.
pub fn filename_from_url(url: &str) -> String {
    let last = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    };

    last.map(|segment| segment.trim().to_string())
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}

/// Normalize a declared content type, defaulting to [`FALLBACK_MIME_TYPE`].
///
/// Parameters such as `; charset=binary` are dropped. Generic binary types
/// such as `application/octet-stream`, which relays send for any body,
/// are treated as undeclared.
pub fn normalize_mime(declared: Option<&str>) -> String {
    declared
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_ascii_lowercase)
        .filter(|value| !OPAQUE_MIME_TYPES.contains(&value.as_str()))
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string())
}
