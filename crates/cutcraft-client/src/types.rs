//! Response envelopes mirroring the server's JSON bodies.

use serde::Deserialize;

use cutcraft_models::{BillingRecord, UserProfile, VideoId, VideoRecord};

#[derive(Debug, Clone, Deserialize)]
pub struct SignupUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupResponse {
    pub user: SignupUser,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpgradeResponse {
    pub profile: UserProfile,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillingResponse {
    pub billing_history: Vec<BillingRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub video_id: VideoId,
    pub message: String,
    pub video: VideoRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessResponse {
    pub message: String,
    pub video: VideoRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoResponse {
    pub video: VideoRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideosResponse {
    pub videos: Vec<VideoRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadResponse {
    pub download_url: String,
    pub expires_at: String,
}

/// Error body shape shared by every failing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}
