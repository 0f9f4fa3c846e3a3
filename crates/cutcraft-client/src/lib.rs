//! Client for the CutCraft API.
//!
//! This crate provides:
//! - A typed HTTP client for every API endpoint
//! - An explicit session object with state-change subscriptions
//! - The status polling loop that tracks a video through processing

pub mod client;
pub mod error;
pub mod poller;
pub mod session;
pub mod types;

pub use client::{ApiClient, ApiClientConfig};
pub use error::{ClientError, ClientResult};
pub use poller::{PollEnd, PollOutcome, PollerConfig, StatusPoller, DEFAULT_POLL_INTERVAL};
pub use session::{AuthState, Session};
