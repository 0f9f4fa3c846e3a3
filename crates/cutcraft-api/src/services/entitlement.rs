//! Usage/entitlement gate.
//!
//! Two checkpoints guard the pipeline: upload (storage cost) and
//! processing-start (compute cost). The edit quota applies to free-plan
//! users only; size ceilings apply to every plan.

use cutcraft_models::{format_bytes, PlanTier, UserProfile, FREE_EDIT_LIMIT};

use crate::error::{ApiError, ApiResult};

/// Reject the request when a free-plan user has exhausted their edits.
pub fn check_edit_quota(profile: &UserProfile) -> ApiResult<()> {
    if profile.plan == PlanTier::Free && profile.video_edits_used >= FREE_EDIT_LIMIT {
        return Err(ApiError::quota_exceeded(
            "Free plan limit reached. Upgrade to Pro for unlimited edits.",
        ));
    }
    Ok(())
}

/// Reject uploads that exceed the plan's size ceiling.
///
/// The ceiling is inclusive: a file at exactly the limit is accepted.
pub fn check_upload_size(profile: &UserProfile, file_size_bytes: u64) -> ApiResult<()> {
    let limit = profile.plan.upload_limit_bytes();
    if file_size_bytes > limit {
        return Err(ApiError::payload_too_large(format!(
            "File too large. {} limit for {} plan.",
            format_bytes(limit),
            profile.plan
        )));
    }
    Ok(())
}

/// Decide whether a new upload may enter the system.
pub fn can_accept_upload(profile: &UserProfile, file_size_bytes: u64) -> ApiResult<()> {
    check_edit_quota(profile)?;
    check_upload_size(profile, file_size_bytes)
}
