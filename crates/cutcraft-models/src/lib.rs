//! Shared data models for the CutCraft backend.
//!
//! This crate provides Serde-serializable types for:
//! - User profiles and plan tiers
//! - Video records and the processing lifecycle
//! - Billing history
//! - Record-store key layout

pub mod billing;
pub mod keys;
pub mod plan;
pub mod user;
pub mod video;

// Re-export common types
pub use billing::BillingRecord;
pub use plan::{
    format_bytes, PlanTier, FREE_EDIT_LIMIT, FREE_UPLOAD_LIMIT_BYTES, PRO_PLAN_PRICE,
    PRO_UPLOAD_LIMIT_BYTES,
};
pub use user::{PlanChange, PlanChangeError, UserProfile};
pub use video::{StateError, VideoId, VideoRecord, VideoStatus, PROCESSING_WINDOW};
