//! Video records and the processing lifecycle.
//!
//! The lifecycle is `uploaded -> processing -> completed | error`. Progress
//! while processing is not advanced by any background task: it is derived
//! from `processing_started_at` and the caller-supplied clock on every read,
//! so the record survives process restarts and needs no scheduler.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Wall-clock window after which a processing video is deemed complete.
pub const PROCESSING_WINDOW: Duration = Duration::from_secs(10);

/// Unique identifier for an uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Video lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    /// Stored but not yet submitted for processing
    #[default]
    Uploaded,
    /// Processing in flight; progress derives from elapsed time
    Processing,
    /// Processing finished; the processed file path is set
    Completed,
    /// Processing failed
    Error,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Uploaded => "uploaded",
            VideoStatus::Processing => "processing",
            VideoStatus::Completed => "completed",
            VideoStatus::Error => "error",
        }
    }

    /// Check if this is a terminal state (no outgoing transition).
    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoStatus::Completed | VideoStatus::Error)
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised by invalid lifecycle transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("cannot {action} a video in status {from}")]
    InvalidTransition {
        from: VideoStatus,
        action: &'static str,
    },
}

/// A stored video record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    pub id: VideoId,

    /// Owning user id (back-reference; the user_video index enumerates).
    pub user_id: String,

    /// Original file name as uploaded.
    pub file_name: String,

    /// Object-storage path of the uploaded file.
    pub file_path: String,

    /// Upload size in bytes.
    pub file_size: u64,

    #[serde(default)]
    pub status: VideoStatus,

    /// Synthetic progress, 0-100. Non-decreasing while processing.
    #[serde(default)]
    pub processing_progress: u8,

    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_started_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_completed_at: Option<DateTime<Utc>>,

    /// Object-storage path of the processed output, set on completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_file_path: Option<String>,

    /// Failure detail, set when the record enters the error state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl VideoRecord {
    /// Create a new record for a stored upload.
    pub fn new(
        id: VideoId,
        user_id: impl Into<String>,
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        file_size: u64,
    ) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            file_name: file_name.into(),
            file_path: file_path.into(),
            file_size,
            status: VideoStatus::Uploaded,
            processing_progress: 0,
            created_at: Utc::now(),
            processing_started_at: None,
            processing_completed_at: None,
            processed_file_path: None,
            error_message: None,
        }
    }

    /// Move an uploaded video into processing.
    ///
    /// Guarded: the current status must be exactly `uploaded`. The caller
    /// supplies the clock so the transition is a pure function of record
    /// state, and must hold the per-video critical section while persisting.
    pub fn start_processing(&mut self, now: DateTime<Utc>) -> Result<(), StateError> {
        if self.status != VideoStatus::Uploaded {
            return Err(StateError::InvalidTransition {
                from: self.status,
                action: "process",
            });
        }
        self.status = VideoStatus::Processing;
        self.processing_started_at = Some(now);
        self.processing_progress = 0;
        Ok(())
    }

    /// Synthetic progress at `now`, derived from the start timestamp.
    ///
    /// Clamped to 0..=100 and floored at the stored progress so repeated
    /// reads never go backwards, even if the wall clock does.
    pub fn progress_at(&self, now: DateTime<Utc>) -> u8 {
        if self.status != VideoStatus::Processing {
            return self.processing_progress;
        }
        let Some(started) = self.processing_started_at else {
            return self.processing_progress;
        };

        let elapsed_ms = now.signed_duration_since(started).num_milliseconds().max(0);
        let window_ms = PROCESSING_WINDOW.as_millis() as i64;
        let pct = (elapsed_ms.saturating_mul(100) / window_ms).clamp(0, 100) as u8;

        pct.max(self.processing_progress)
    }

    /// Advance the record from elapsed wall-clock time.
    ///
    /// Returns `true` when the record changed and should be persisted.
    /// Terminal records are never touched, so re-reads after completion
    /// observe an identical record.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != VideoStatus::Processing {
            return false;
        }

        let progress = self.progress_at(now);
        if progress >= 100 {
            self.complete(now);
            true
        } else if progress != self.processing_progress {
            self.processing_progress = progress;
            true
        } else {
            false
        }
    }

    /// Internal failure signal; moves a processing video into the error
    /// terminal state.
    pub fn mark_failed(
        &mut self,
        now: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Result<(), StateError> {
        if self.status != VideoStatus::Processing {
            return Err(StateError::InvalidTransition {
                from: self.status,
                action: "fail",
            });
        }
        self.status = VideoStatus::Error;
        self.processing_completed_at = Some(now);
        self.error_message = Some(message.into());
        Ok(())
    }

    fn complete(&mut self, now: DateTime<Utc>) {
        self.status = VideoStatus::Completed;
        self.processing_progress = 100;
        self.processing_completed_at = Some(now);
        self.processed_file_path = Some(format!("processed/{}", self.file_path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn sample_video() -> VideoRecord {
        VideoRecord::new(
            VideoId::new(),
            "user-1",
            "clip.mp4",
            "user-1/1700000000_clip.mp4",
            50 * 1024 * 1024,
        )
    }

    fn window() -> ChronoDuration {
        ChronoDuration::from_std(PROCESSING_WINDOW).unwrap()
    }

    #[test]
    fn test_video_id_generation() {
        let id1 = VideoId::new();
        let id2 = VideoId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_record_is_uploaded() {
        let video = sample_video();
        assert_eq!(video.status, VideoStatus::Uploaded);
        assert_eq!(video.processing_progress, 0);
        assert!(video.processing_started_at.is_none());
        assert!(!video.status.is_terminal());
    }

    #[test]
    fn test_start_processing_from_uploaded() {
        let mut video = sample_video();
        let now = Utc::now();

        video.start_processing(now).unwrap();
        assert_eq!(video.status, VideoStatus::Processing);
        assert_eq!(video.processing_started_at, Some(now));
        assert_eq!(video.processing_progress, 0);
    }

    #[test]
    fn test_start_processing_guard() {
        let mut video = sample_video();
        let now = Utc::now();
        video.start_processing(now).unwrap();

        let err = video.start_processing(now).unwrap_err();
        assert_eq!(
            err,
            StateError::InvalidTransition {
                from: VideoStatus::Processing,
                action: "process",
            }
        );

        video.refresh(now + window());
        assert_eq!(video.status, VideoStatus::Completed);
        assert!(video.start_processing(now).is_err());
    }

    #[test]
    fn test_progress_is_zero_immediately() {
        let mut video = sample_video();
        let now = Utc::now();
        video.start_processing(now).unwrap();

        assert_eq!(video.progress_at(now), 0);
    }

    #[test]
    fn test_progress_halfway_through_window() {
        let mut video = sample_video();
        let now = Utc::now();
        video.start_processing(now).unwrap();

        assert_eq!(video.progress_at(now + window() / 2), 50);
    }

    #[test]
    fn test_progress_clamped_past_window() {
        let mut video = sample_video();
        let now = Utc::now();
        video.start_processing(now).unwrap();

        assert_eq!(video.progress_at(now + window() * 3), 100);
    }

    #[test]
    fn test_progress_never_decreases() {
        let mut video = sample_video();
        let now = Utc::now();
        video.start_processing(now).unwrap();

        assert!(video.refresh(now + window() / 2));
        assert_eq!(video.processing_progress, 50);

        // A read with an earlier clock must not move progress backwards.
        assert_eq!(video.progress_at(now + window() / 4), 50);
        assert!(!video.refresh(now + window() / 4));
        assert_eq!(video.processing_progress, 50);
    }

    #[test]
    fn test_refresh_completes_after_window() {
        let mut video = sample_video();
        let now = Utc::now();
        video.start_processing(now).unwrap();

        let done = now + window();
        assert!(video.refresh(done));
        assert_eq!(video.status, VideoStatus::Completed);
        assert_eq!(video.processing_progress, 100);
        assert_eq!(video.processing_completed_at, Some(done));
        assert_eq!(
            video.processed_file_path.as_deref(),
            Some("processed/user-1/1700000000_clip.mp4")
        );
    }

    #[test]
    fn test_completed_record_is_stable() {
        let mut video = sample_video();
        let now = Utc::now();
        video.start_processing(now).unwrap();
        video.refresh(now + window());

        let snapshot = video.clone();
        assert!(!video.refresh(now + window() * 2));
        assert_eq!(video, snapshot);
        assert_eq!(video.progress_at(now + window() * 5), 100);
    }

    #[test]
    fn test_refresh_noop_while_uploaded() {
        let mut video = sample_video();
        assert!(!video.refresh(Utc::now() + window()));
        assert_eq!(video.status, VideoStatus::Uploaded);
    }

    #[test]
    fn test_refresh_reports_unchanged_progress() {
        let mut video = sample_video();
        let now = Utc::now();
        video.start_processing(now).unwrap();

        // Two reads within the same percent bucket: second one is a no-op.
        assert!(!video.refresh(now));
        assert!(video.refresh(now + window() / 10));
        assert!(!video.refresh(now + window() / 10));
    }

    #[test]
    fn test_mark_failed_from_processing() {
        let mut video = sample_video();
        let now = Utc::now();
        video.start_processing(now).unwrap();

        video.mark_failed(now, "storage unavailable").unwrap();
        assert_eq!(video.status, VideoStatus::Error);
        assert!(video.status.is_terminal());
        assert_eq!(video.error_message.as_deref(), Some("storage unavailable"));

        // Error is terminal: no refresh and no restart.
        assert!(!video.refresh(now + window()));
        assert!(video.start_processing(now).is_err());
    }

    #[test]
    fn test_mark_failed_guard() {
        let mut video = sample_video();
        assert!(video.mark_failed(Utc::now(), "boom").is_err());
    }

    #[test]
    fn test_status_serde_names() {
        assert_eq!(
            serde_json::to_string(&VideoStatus::Uploaded).unwrap(),
            "\"uploaded\""
        );
        assert_eq!(
            serde_json::to_string(&VideoStatus::Completed).unwrap(),
            "\"completed\""
        );
        let parsed: VideoStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, VideoStatus::Error);
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let mut video = sample_video();
        let now = Utc::now();
        video.start_processing(now).unwrap();
        video.refresh(now + window());

        let json = serde_json::to_value(&video).unwrap();
        let parsed: VideoRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, video);
    }
}
