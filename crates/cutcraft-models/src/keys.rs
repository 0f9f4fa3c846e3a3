//! Record-store key layout.
//!
//! All entities share one keyed namespace. Keys are entity-type-prefixed so
//! prefix scans answer the per-user queries ("all billing records for user
//! X", "all video ids for user X") without any index structure beyond the
//! `user_video` entries, which are written in the same operation as the
//! video record they point at.

/// Key for a user profile.
pub fn user(user_id: &str) -> String {
    format!("user:{user_id}")
}

/// Key for a video record.
pub fn video(video_id: &str) -> String {
    format!("video:{video_id}")
}

/// Key for a user-to-video index entry.
pub fn user_video(user_id: &str, video_id: &str) -> String {
    format!("user_video:{user_id}:{video_id}")
}

/// Prefix matching all of a user's video index entries.
pub fn user_video_prefix(user_id: &str) -> String {
    format!("user_video:{user_id}:")
}

/// Key for a billing record, disambiguated by write time.
pub fn billing(user_id: &str, millis: i64) -> String {
    format!("billing:{user_id}:{millis}")
}

/// Prefix matching all of a user's billing records.
pub fn billing_prefix(user_id: &str) -> String {
    format!("billing:{user_id}:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(user("u1"), "user:u1");
        assert_eq!(video("v1"), "video:v1");
        assert_eq!(user_video("u1", "v1"), "user_video:u1:v1");
        assert_eq!(billing("u1", 1700000000000), "billing:u1:1700000000000");
    }

    #[test]
    fn test_prefixes_match_their_keys() {
        assert!(user_video("u1", "v1").starts_with(&user_video_prefix("u1")));
        assert!(billing("u1", 42).starts_with(&billing_prefix("u1")));
        // A user id that extends another must not match its prefix.
        assert!(!user_video("u12", "v1").starts_with(&user_video_prefix("u1")));
    }
}
