//! Typed repositories over the record store.

use tracing::info;

use cutcraft_models::{keys, BillingRecord, UserProfile, VideoId, VideoRecord};

use crate::client::KvClient;
use crate::error::KvResult;

/// Repository for user profiles.
#[derive(Clone)]
pub struct UserRepository {
    kv: KvClient,
}

impl UserRepository {
    pub fn new(kv: KvClient) -> Self {
        Self { kv }
    }

    /// Get a profile by user id.
    pub async fn get(&self, user_id: &str) -> KvResult<Option<UserProfile>> {
        self.kv.get_json(&keys::user(user_id)).await
    }

    /// Store a profile, overwriting any previous version.
    pub async fn put(&self, profile: &UserProfile) -> KvResult<()> {
        self.kv.set_json(&keys::user(&profile.id), profile).await
    }
}

/// Repository for video records and their owner index.
#[derive(Clone)]
pub struct VideoRepository {
    kv: KvClient,
}

impl VideoRepository {
    pub fn new(kv: KvClient) -> Self {
        Self { kv }
    }

    /// Get a video record by id.
    pub async fn get(&self, video_id: &VideoId) -> KvResult<Option<VideoRecord>> {
        self.kv.get_json(&keys::video(video_id.as_str())).await
    }

    /// Store an updated video record.
    pub async fn put(&self, video: &VideoRecord) -> KvResult<()> {
        self.kv.set_json(&keys::video(video.id.as_str()), video).await
    }

    /// Store a new video record together with its owner index entry.
    ///
    /// The index entry is derived data and must be written in the same
    /// operation as the record it points at.
    pub async fn create(&self, video: &VideoRecord) -> KvResult<()> {
        self.put(video).await?;
        self.kv
            .set(
                &keys::user_video(&video.user_id, video.id.as_str()),
                &serde_json::Value::String(video.id.as_str().to_string()),
            )
            .await?;
        info!(video_id = %video.id, user_id = %video.user_id, "created video record");
        Ok(())
    }

    /// List the ids of all videos owned by `user_id`, in storage order.
    pub async fn list_ids(&self, user_id: &str) -> KvResult<Vec<String>> {
        let values = self
            .kv
            .get_by_prefix(&keys::user_video_prefix(user_id))
            .await?;

        Ok(values
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect())
    }

    /// Fetch all videos owned by `user_id`, in storage order.
    ///
    /// Index entries whose record has gone missing are skipped.
    pub async fn list_for_user(&self, user_id: &str) -> KvResult<Vec<VideoRecord>> {
        let ids = self.list_ids(user_id).await?;

        let mut videos = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(video) = self.get(&VideoId::from_string(id)).await? {
                videos.push(video);
            }
        }
        Ok(videos)
    }
}

/// Repository for append-only billing records.
#[derive(Clone)]
pub struct BillingRepository {
    kv: KvClient,
}

impl BillingRepository {
    pub fn new(kv: KvClient) -> Self {
        Self { kv }
    }

    /// Append a billing record.
    pub async fn append(&self, record: &BillingRecord) -> KvResult<()> {
        let key = keys::billing(&record.user_id, record.date.timestamp_millis());
        self.kv.set_json(&key, record).await
    }

    /// List all billing records for `user_id`, in storage order.
    pub async fn list_for_user(&self, user_id: &str) -> KvResult<Vec<BillingRecord>> {
        let values = self
            .kv
            .get_by_prefix(&keys::billing_prefix(user_id))
            .await?;

        Ok(values
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect())
    }
}
