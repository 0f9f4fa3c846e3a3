//! Record-store REST API client.
//!
//! This crate provides:
//! - A key/value client over the managed backend's REST surface
//!   (point get, upsert set, prefix scan)
//! - Typed repositories for user profiles, videos, and billing records
//! - Retry with exponential backoff and jitter
//! - Request/retry metrics

pub mod client;
pub mod error;
pub mod metrics;
pub mod repos;
pub mod retry;

pub use client::{KvClient, KvConfig};
pub use error::{KvError, KvResult};
pub use repos::{BillingRepository, UserRepository, VideoRepository};
pub use retry::RetryConfig;
