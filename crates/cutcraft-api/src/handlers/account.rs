//! Account handlers: signup, profile, upgrade, billing history.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::ValidateEmail;

use cutcraft_models::{BillingRecord, PlanTier, UserProfile};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Serialize)]
pub struct SignupUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub user: SignupUser,
    pub message: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub profile: UserProfile,
}

#[derive(Deserialize)]
pub struct UpgradeRequest {
    pub plan: Option<String>,
}

#[derive(Serialize)]
pub struct UpgradeResponse {
    pub profile: UserProfile,
    pub message: String,
}

#[derive(Serialize)]
pub struct BillingResponse {
    pub billing_history: Vec<BillingRecord>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create an account with the auth provider and seed a free-plan profile.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<Json<SignupResponse>> {
    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Email and password are required"))?;
    let password = req
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Email and password are required"))?;

    if !email.validate_email() {
        return Err(ApiError::validation("Invalid email address"));
    }

    let created = state
        .auth_admin
        .create_user(email, password, req.name.as_deref())
        .await?;

    let profile = UserProfile::new(&created.id, email, req.name);
    state.users.put(&profile).await?;

    info!(user_id = %created.id, "signup complete");

    Ok(Json(SignupResponse {
        user: SignupUser {
            id: created.id,
            email: email.to_string(),
            name: profile.name,
        },
        message: "User created successfully".to_string(),
    }))
}

/// Get the caller's profile, creating it lazily when absent.
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .user_service
        .get_or_create(&user.uid, user.email.as_deref())
        .await?;

    Ok(Json(ProfileResponse { profile }))
}

/// Change the caller's plan; pro upgrades append one billing record.
pub async fn upgrade(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UpgradeRequest>,
) -> ApiResult<Json<UpgradeResponse>> {
    let plan = req
        .plan
        .as_deref()
        .and_then(PlanTier::parse)
        .ok_or_else(|| ApiError::validation("Invalid plan type"))?;

    let profile = state.user_service.upgrade(&user.uid, plan).await?;

    Ok(Json(UpgradeResponse {
        profile,
        message: format!("Successfully upgraded to {} plan", plan),
    }))
}

/// Billing history, newest first.
pub async fn billing_history(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<BillingResponse>> {
    let mut records = state.billing.list_for_user(&user.uid).await?;
    records.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(Json(BillingResponse {
        billing_history: records,
    }))
}
