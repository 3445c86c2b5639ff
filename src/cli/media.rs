//! Media input classification
//!
//! Turns raw user input (URLs and local image paths) into validated
//! [`MediaEntry`] values. URLs are classified by host, with YouTube hosts
//! becoming video entries. Local photos are inlined as base64 data URIs so
//! the deck stays self-contained after export.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use camino::Utf8Path;
use url::Url;

use deckgen_utils::error::MediaInputError;
use deckgen_utils::types::{MediaEntry, MediaKind};

/// Largest local photo accepted for inlining, in bytes.
pub const MAX_PHOTO_BYTES: u64 = 2 * 1024 * 1024;

/// Build a gallery entry from a URL.
///
/// The locator keeps the text exactly as the user typed it; parsing is only
/// used for validation and host classification.
pub fn entry_from_url(raw: &str, label: &str) -> Result<MediaEntry, MediaInputError> {
    let label = normalize_label(label)?;
    let parsed =
        Url::parse(raw).map_err(|e| MediaInputError::InvalidUrl(format!("{raw}: {e}")))?;

    let host = parsed.host_str().unwrap_or_default();
    let kind = if host.contains("youtube.com") || host.contains("youtu.be") {
        MediaKind::Video
    } else {
        MediaKind::Link
    };

    Ok(MediaEntry {
        kind,
        locator: raw.to_string(),
        label,
    })
}

/// Build a gallery entry from a local image file, inlined as a data URI.
pub fn entry_from_photo(path: &Utf8Path, label: &str) -> Result<MediaEntry, MediaInputError> {
    let label = normalize_label(label)?;

    let unreadable = |reason: String| MediaInputError::UnreadableImage {
        path: path.to_string(),
        reason,
    };

    let metadata = std::fs::metadata(path).map_err(|e| unreadable(e.to_string()))?;
    if metadata.len() > MAX_PHOTO_BYTES {
        return Err(MediaInputError::ImageTooLarge {
            size: metadata.len(),
            limit: MAX_PHOTO_BYTES,
        });
    }

    let bytes = std::fs::read(path).map_err(|e| unreadable(e.to_string()))?;
    let mime = image::guess_format(&bytes)
        .map_err(|_| unreadable("not a recognized image format".to_string()))?
        .to_mime_type();

    Ok(MediaEntry {
        kind: MediaKind::Photo,
        locator: format!("data:{mime};base64,{}", BASE64.encode(&bytes)),
        label,
    })
}

fn normalize_label(label: &str) -> Result<String, MediaInputError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(MediaInputError::EmptyLabel);
    }
    Ok(trimmed.to_string())
}
