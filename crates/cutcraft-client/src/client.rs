//! Typed HTTP client for the CutCraft API.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use cutcraft_models::{BillingRecord, UserProfile, VideoId, VideoRecord};

use crate::error::{ClientError, ClientResult};
use crate::session::Session;
use crate::types::{
    BillingResponse, DownloadResponse, ErrorBody, ProcessResponse, ProfileResponse,
    SignupResponse, UpgradeResponse, UploadResponse, VideoResponse, VideosResponse,
};

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the API server.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ApiClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("CUTCRAFT_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            timeout: Duration::from_secs(
                std::env::var("CUTCRAFT_API_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

/// Client for the CutCraft API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiClientConfig,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: ApiClientConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ApiClientConfig::from_env())
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/api/v1{}",
            self.config.base_url.trim_end_matches('/'),
            path
        )
    }

    fn token(session: &Session) -> ClientResult<String> {
        session.access_token().ok_or(ClientError::NotSignedIn)
    }

    /// Create an account.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> ClientResult<SignupResponse> {
        let response = self
            .http
            .post(self.url("/signup"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "name": name,
            }))
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Fetch the caller's profile.
    pub async fn profile(&self, session: &Session) -> ClientResult<UserProfile> {
        let response = self
            .http
            .get(self.url("/profile"))
            .bearer_auth(Self::token(session)?)
            .send()
            .await?;

        let body: ProfileResponse = Self::handle(response).await?;
        Ok(body.profile)
    }

    /// Change the caller's plan.
    pub async fn upgrade(&self, session: &Session, plan: &str) -> ClientResult<UserProfile> {
        let response = self
            .http
            .post(self.url("/upgrade"))
            .bearer_auth(Self::token(session)?)
            .json(&serde_json::json!({ "plan": plan }))
            .send()
            .await?;

        let body: UpgradeResponse = Self::handle(response).await?;
        Ok(body.profile)
    }

    /// Fetch billing history, newest first.
    pub async fn billing_history(&self, session: &Session) -> ClientResult<Vec<BillingRecord>> {
        let response = self
            .http
            .get(self.url("/billing"))
            .bearer_auth(Self::token(session)?)
            .send()
            .await?;

        let body: BillingResponse = Self::handle(response).await?;
        Ok(body.billing_history)
    }

    /// Upload a video file.
    pub async fn upload(
        &self,
        session: &Session,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<UploadResponse> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("video", part);

        let response = self
            .http
            .post(self.url("/upload"))
            .bearer_auth(Self::token(session)?)
            .multipart(form)
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Ask the server to start processing a video.
    pub async fn start_processing(
        &self,
        session: &Session,
        video_id: &VideoId,
    ) -> ClientResult<VideoRecord> {
        let response = self
            .http
            .post(self.url(&format!("/process/{}", video_id)))
            .bearer_auth(Self::token(session)?)
            .send()
            .await?;

        let body: ProcessResponse = Self::handle(response).await?;
        Ok(body.video)
    }

    /// Fetch the current status of a video.
    pub async fn video_status(
        &self,
        session: &Session,
        video_id: &VideoId,
    ) -> ClientResult<VideoRecord> {
        let response = self
            .http
            .get(self.url(&format!("/video/{}", video_id)))
            .bearer_auth(Self::token(session)?)
            .send()
            .await?;

        let body: VideoResponse = Self::handle(response).await?;
        Ok(body.video)
    }

    /// Fetch a signed download URL for a completed video.
    pub async fn download_url(
        &self,
        session: &Session,
        video_id: &VideoId,
    ) -> ClientResult<DownloadResponse> {
        let response = self
            .http
            .get(self.url(&format!("/download/{}", video_id)))
            .bearer_auth(Self::token(session)?)
            .send()
            .await?;

        Self::handle(response).await
    }

    /// Fetch all of the caller's videos, newest first.
    pub async fn list_videos(&self, session: &Session) -> ClientResult<Vec<VideoRecord>> {
        let response = self
            .http
            .get(self.url("/videos"))
            .bearer_auth(Self::token(session)?)
            .send()
            .await?;

        let body: VideosResponse = Self::handle(response).await?;
        Ok(body.videos)
    }

    /// Check whether the API is up.
    pub async fn health(&self) -> ClientResult<bool> {
        let url = format!(
            "{}/health",
            self.config.base_url.trim_end_matches('/')
        );

        match self.http.get(url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                debug!("health check failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Decode a success body or surface the server's error message.
    async fn handle<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response.text().await.unwrap_or_default();
        let (message, code) = match serde_json::from_str::<ErrorBody>(&message) {
            Ok(body) => (body.message, body.code),
            Err(_) => (message, None),
        };

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
            code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ApiClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_url_building() {
        let client = ApiClient::new(ApiClientConfig {
            base_url: "http://localhost:8000/".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        assert_eq!(client.url("/videos"), "http://localhost:8000/api/v1/videos");
    }
}
