//! Application state.

use std::sync::Arc;

use cutcraft_kv::{BillingRepository, KvClient, UserRepository, VideoRepository};
use cutcraft_storage::StorageClient;

use crate::auth::{AuthAdmin, TokenVerifier};
use crate::config::ApiConfig;
use crate::services::{UserService, VideoLockMap};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub kv: KvClient,
    pub storage: Arc<StorageClient>,
    pub users: UserRepository,
    pub videos: VideoRepository,
    pub billing: BillingRepository,
    pub verifier: Arc<TokenVerifier>,
    pub auth_admin: Arc<AuthAdmin>,
    pub user_service: UserService,
    pub video_locks: Arc<VideoLockMap>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let kv = KvClient::from_env()?;
        let storage = StorageClient::from_env().await?;
        let verifier = TokenVerifier::from_env()?;
        let auth_admin = AuthAdmin::from_env()?;

        let users = UserRepository::new(kv.clone());
        let videos = VideoRepository::new(kv.clone());
        let billing = BillingRepository::new(kv.clone());
        let user_service = UserService::new(users.clone(), billing.clone());

        Ok(Self {
            config,
            kv,
            storage: Arc::new(storage),
            users,
            videos,
            billing,
            verifier: Arc::new(verifier),
            auth_admin: Arc::new(auth_admin),
            user_service,
            video_locks: Arc::new(VideoLockMap::new()),
        })
    }
}
