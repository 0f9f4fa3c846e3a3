//! Status polling protocol.
//!
//! While the tracked video is processing, poll the status endpoint on a
//! fixed cadence and replace the held record wholesale with the server's
//! answer; the server is the single source of truth and the client never
//! extrapolates progress. On a terminal status the loop stops and performs
//! exactly two refreshes: the profile (the edit counter may have moved) and
//! the caller's video list.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::warn;

use cutcraft_models::{UserProfile, VideoRecord, VideoStatus};

use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::session::Session;

/// Fixed polling cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Poller configuration.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Interval between status polls.
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// State reloaded after the video reached a terminal status.
#[derive(Debug)]
pub struct PollOutcome {
    /// The terminal video record.
    pub video: VideoRecord,
    /// Freshly loaded profile.
    pub profile: UserProfile,
    /// Freshly loaded video list, newest first.
    pub videos: Vec<VideoRecord>,
}

/// How the poll loop ended.
#[derive(Debug)]
pub enum PollEnd {
    /// The video reached a terminal status.
    Terminal(Box<PollOutcome>),
    /// The caller tore the loop down first.
    Cancelled,
}

/// Poll loop tracking one video through processing.
pub struct StatusPoller {
    client: ApiClient,
    config: PollerConfig,
}

impl StatusPoller {
    /// Create a poller with the default cadence.
    pub fn new(client: ApiClient) -> Self {
        Self::with_config(client, PollerConfig::default())
    }

    /// Create a poller with a custom cadence.
    pub fn with_config(client: ApiClient, config: PollerConfig) -> Self {
        Self { client, config }
    }

    /// Run the loop until the video reaches a terminal state or `cancel`
    /// fires.
    ///
    /// `on_update` observes every server snapshot, including the final one.
    /// A failed poll is logged and the loop continues at the same cadence.
    /// Dropping the cancel sender also tears the loop down, so holding the
    /// handle alongside the tracked video gives teardown-on-navigation for
    /// free. The poller is bound to the identity of the record it was
    /// started with: when the tracked video changes, cancel this loop and
    /// start a new one instead of reusing it against a stale identifier.
    pub async fn run<F>(
        &self,
        session: &Session,
        mut video: VideoRecord,
        mut cancel: oneshot::Receiver<()>,
        mut on_update: F,
    ) -> ClientResult<PollEnd>
    where
        F: FnMut(&VideoRecord),
    {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; consume it so polls start
        // one interval after the processing request.
        ticker.tick().await;

        while video.status == VideoStatus::Processing {
            tokio::select! {
                _ = &mut cancel => return Ok(PollEnd::Cancelled),
                _ = ticker.tick() => {}
            }

            match self.client.video_status(session, &video.id).await {
                Ok(latest) => {
                    video = latest;
                    on_update(&video);
                }
                Err(e) => warn!("status poll failed: {}", e),
            }
        }

        let profile = self.client.profile(session).await?;
        let videos = self.client.list_videos(session).await?;

        Ok(PollEnd::Terminal(Box::new(PollOutcome {
            video,
            profile,
            videos,
        })))
    }
}
