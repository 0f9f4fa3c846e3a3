//! Processing-start orchestration.
//!
//! The record store offers no transactions, so the `uploaded -> processing`
//! check-and-set runs under an in-process per-video lock: the status guard,
//! the write, and the usage increment form one critical section.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

use cutcraft_models::{VideoId, VideoRecord};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::services::entitlement;
use crate::state::AppState;

/// Maximum number of video locks to keep cached.
const MAX_LOCK_ENTRIES: usize = 10_000;

/// Per-video lock registry.
///
/// Idle entries are pruned once the map grows past its cap; a lock is idle
/// when nobody but the map holds it.
pub struct VideoLockMap {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl VideoLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the lock guarding one video's transitions.
    pub async fn acquire(&self, video_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.len() >= MAX_LOCK_ENTRIES {
                locks.retain(|_, l| Arc::strong_count(l) > 1);
            }
            Arc::clone(
                locks
                    .entry(video_id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}

impl Default for VideoLockMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Start processing a video owned by the caller.
///
/// The quota check runs before any mutation, so a rejected request leaves
/// the video in `uploaded`. Ownership mismatches report as not-found.
pub async fn start_processing(
    state: &AppState,
    user: &AuthUser,
    video_id: &VideoId,
) -> ApiResult<VideoRecord> {
    let _guard = state.video_locks.acquire(video_id.as_str()).await;

    let mut video = state
        .videos
        .get(video_id)
        .await?
        .filter(|v| v.user_id == user.uid)
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    let mut profile = state
        .user_service
        .get_or_create(&user.uid, user.email.as_deref())
        .await?;
    entitlement::check_edit_quota(&profile)?;

    video
        .start_processing(Utc::now())
        .map_err(|e| ApiError::invalid_state(e.to_string()))?;
    state.videos.put(&video).await?;

    state.user_service.record_edit_consumed(&mut profile).await?;

    metrics::record_processing_started();
    info!(video_id = %video.id, user_id = %user.uid, "processing started");
    Ok(video)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_lock_map_serializes_same_video() {
        let map = VideoLockMap::new();

        let guard = map.acquire("video-1").await;
        let blocked = tokio::time::timeout(Duration::from_millis(20), map.acquire("video-1")).await;
        assert!(blocked.is_err(), "second acquire should block");

        drop(guard);
        let reacquired =
            tokio::time::timeout(Duration::from_millis(100), map.acquire("video-1")).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_lock_map_is_per_video() {
        let map = VideoLockMap::new();

        let _guard = map.acquire("video-1").await;
        let other = tokio::time::timeout(Duration::from_millis(100), map.acquire("video-2")).await;
        assert!(other.is_ok(), "different videos must not contend");
    }
}
