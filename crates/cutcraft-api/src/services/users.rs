//! User profile service: lazy creation, upgrades, usage accounting.

use chrono::Utc;
use tracing::info;

use cutcraft_kv::{BillingRepository, UserRepository};
use cutcraft_models::{BillingRecord, PlanChange, PlanTier, UserProfile};

use crate::error::{ApiError, ApiResult};

/// Service for profile and billing operations.
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    billing: BillingRepository,
}

impl UserService {
    /// Create a new user service.
    pub fn new(users: UserRepository, billing: BillingRepository) -> Self {
        Self { users, billing }
    }

    /// Get the caller's profile, creating a fresh free-plan one if absent.
    pub async fn get_or_create(&self, uid: &str, email: Option<&str>) -> ApiResult<UserProfile> {
        if let Some(profile) = self.users.get(uid).await? {
            return Ok(profile);
        }

        let profile = UserProfile::new(uid, email.unwrap_or(uid), None);
        self.users.put(&profile).await?;
        info!(user_id = %uid, "created profile");
        Ok(profile)
    }

    /// Record one consumed edit and persist the profile.
    ///
    /// Called exactly once per successful transition into processing.
    pub async fn record_edit_consumed(&self, profile: &mut UserProfile) -> ApiResult<()> {
        profile.record_edit();
        self.users.put(profile).await?;
        Ok(())
    }

    /// Apply an upgrade request for `uid`.
    ///
    /// The billing record is written only when the plan actually moves from
    /// free to pro, so repeated upgrade calls stay append-once.
    pub async fn upgrade(&self, uid: &str, plan: PlanTier) -> ApiResult<UserProfile> {
        let mut profile = self
            .users
            .get(uid)
            .await?
            .ok_or_else(|| ApiError::not_found("User profile not found"))?;

        let now = Utc::now();
        match profile.change_plan(plan, now) {
            Ok(PlanChange::Upgraded) => {
                self.users.put(&profile).await?;
                self.billing
                    .append(&BillingRecord::pro_upgrade(uid, now))
                    .await?;
                info!(user_id = %uid, plan = %plan, "plan upgraded");
            }
            Ok(PlanChange::Unchanged) => {}
            Err(e) => return Err(ApiError::validation(e.to_string())),
        }

        Ok(profile)
    }
}
