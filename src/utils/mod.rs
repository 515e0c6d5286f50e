use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Length of a bare YouTube video ID
pub const VIDEO_ID_LEN: usize = 11;

fn video_url_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)",
            r"youtube\.com/shorts/([^&\n?#]+)",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("Failed to compile video URL regex"))
        .collect()
    })
}

/// Extract the video ID from a YouTube URL, or return the input if it already is one.
///
/// Recognizes watch, youtu.be, embed and shorts URLs. Anything else is passed
/// through unchanged and left for the provider to reject.
pub fn extract_video_id(url_or_id: &str) -> String {
    if url_or_id.chars().count() == VIDEO_ID_LEN && !url_or_id.contains('/') {
        return url_or_id.to_string();
    }

    video_url_patterns()
        .iter()
        .find_map(|re| re.captures(url_or_id))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| url_or_id.to_string())
}

/// Canonical watch page URL for a video ID
pub fn watch_url(video_id: &str) -> String {
    format!(
        "https://www.youtube.com/watch?v={}",
        urlencoding::encode(video_id)
    )
}

/// Format a start offset as `M:SS`, truncating fractional seconds
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let minutes = total_seconds / 60;
    let secs = total_seconds % 60;

    format!("{}:{:02}", minutes, secs)
}

/// Collapse runs of whitespace (including newlines) into single spaces
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validate that a URL parses and uses HTTP(S)
pub fn validate_http_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)
        .map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_id_is_returned_unchanged() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        // Any 11 characters without a slash count as an ID
        assert_eq!(extract_video_id("hello world"), "hello world");
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://m.youtube.com/watch?v=dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_short_url() {
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ#start"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_shorts_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_trailing_parameters_are_excluded() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ#t=30"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ\nnext line"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_unknown_format_passthrough() {
        assert_eq!(extract_video_id("not-a-real-url"), "not-a-real-url");
        assert_eq!(
            extract_video_id("https://vimeo.com/123456"),
            "https://vimeo.com/123456"
        );
        assert_eq!(extract_video_id(""), "");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(65.0), "1:05");
        assert_eq!(format_timestamp(65.7), "1:05");
        assert_eq!(format_timestamp(3599.9), "59:59");
        assert_eq!(format_timestamp(7325.0), "122:05");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Hello\n  world\t!"), "Hello world !");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn test_watch_url_encodes_id() {
        assert_eq!(watch_url("dQw4w9WgXcQ"), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(watch_url("a b"), "https://www.youtube.com/watch?v=a%20b");
    }

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("https://www.youtube.com").is_ok());
        assert!(validate_http_url("http://localhost:8080").is_ok());
        assert!(validate_http_url("ftp://example.com").is_err());
        assert!(validate_http_url("not-a-url").is_err());
    }
}
