//! Input validation and sanitization utilities.

/// Maximum stored file-name length.
pub const MAX_FILE_NAME_LENGTH: usize = 256;

/// Sanitize an uploaded file name for use inside an object key.
///
/// Strips any path components and every character outside
/// `[A-Za-z0-9._-]`, and bounds the length. Falls back to a fixed name
/// when nothing usable remains.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .take(MAX_FILE_NAME_LENGTH)
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "upload.bin".to_string()
    } else {
        cleaned
    }
}

/// Validate video ID format.
///
/// Valid format: alphanumeric characters and hyphens only, 8-64 chars.
pub fn is_valid_video_id(id: &str) -> bool {
    if id.len() < 8 || id.len() > 64 {
        return false;
    }
    id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plain_names() {
        assert_eq!(sanitize_file_name("holiday.mp4"), "holiday.mp4");
        assert_eq!(sanitize_file_name("clip_001-final.mov"), "clip_001-final.mov");
    }

    #[test]
    fn test_sanitize_strips_paths() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\videos\\clip.mp4"), "clip.mp4");
    }

    #[test]
    fn test_sanitize_drops_odd_characters() {
        assert_eq!(sanitize_file_name("my movie (1).mp4"), "mymovie1.mp4");
    }

    #[test]
    fn test_sanitize_fallback() {
        assert_eq!(sanitize_file_name(""), "upload.bin");
        assert_eq!(sanitize_file_name("..."), "upload.bin");
        assert_eq!(sanitize_file_name("///"), "upload.bin");
    }

    #[test]
    fn test_sanitize_bounds_length() {
        let long = "a".repeat(1000);
        assert_eq!(sanitize_file_name(&long).len(), MAX_FILE_NAME_LENGTH);
    }

    #[test]
    fn test_video_id_validation() {
        assert!(is_valid_video_id("550e8400-e29b-41d4-a716-446655440000"));
        assert!(is_valid_video_id("12345678"));
        assert!(!is_valid_video_id("short"));
        assert!(!is_valid_video_id("has/slash-in-it"));
        assert!(!is_valid_video_id("has..dots"));
    }
}
