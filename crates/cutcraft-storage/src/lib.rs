//! Object storage client for uploaded and processed videos.
//!
//! Talks to any S3-compatible endpoint: bucket bootstrap on startup,
//! byte uploads, and time-limited presigned download URLs.

pub mod client;
pub mod error;

pub use client::{StorageClient, StorageConfig};
pub use error::{StorageError, StorageResult};
