//! Watch-URL synthesis and video-id extraction.

use crate::error::{YouTubeError, YouTubeResult};

/// Synthesize the canonical playback URL for a published video.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Extract the video ID from a YouTube URL or a bare ID.
///
/// Supported forms:
/// - `https://youtube.com/watch?v=VIDEO_ID`
/// - `https://youtu.be/VIDEO_ID`
/// - `https://youtube.com/embed/VIDEO_ID`
/// - the 11-character ID itself
pub fn extract_video_id(reference: &str) -> YouTubeResult<String> {
    let reference = reference.trim();

    if is_valid_id(reference) {
        return Ok(reference.to_string());
    }

    for marker in ["?v=", "&v="] {
        if let Some(pos) = reference.find(marker) {
            if let Some(id) = take_id_segment(&reference[pos + marker.len()..]) {
                return Ok(id);
            }
        }
    }

    for marker in ["youtu.be/", "/embed/"] {
        if let Some(pos) = reference.find(marker) {
            if let Some(id) = take_id_segment(&reference[pos + marker.len()..]) {
                return Ok(id);
            }
        }
    }

    Err(YouTubeError::InvalidUrl(reference.to_string()))
}

/// Cut an ID out of a URL segment, stopping at any delimiter.
fn take_id_segment(segment: &str) -> Option<String> {
    let id: String = segment
        .chars()
        .take_while(|c| !matches!(c, '?' | '&' | '#' | '/' | '\'' | '"'))
        .collect();

    if is_valid_id(&id) {
        Some(id)
    } else {
        None
    }
}

/// YouTube IDs are 11 characters of [A-Za-z0-9_-].
fn is_valid_id(id: &str) -> bool {
    id.len() == 11
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_extract_from_watch_url() {
        let id = extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_extract_with_extra_params() {
        let id = extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_extract_from_short_url() {
        let id = extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=xyz").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_extract_from_embed_url() {
        let id = extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_extract_bare_id() {
        let id = extract_video_id("dQw4w9WgXcQ").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_extract_rejects_garbage() {
        assert!(extract_video_id("https://example.com/video/123").is_err());
        assert!(extract_video_id("not a url").is_err());
        assert!(extract_video_id("https://www.youtube.com/watch?v=short").is_err());
    }
}
