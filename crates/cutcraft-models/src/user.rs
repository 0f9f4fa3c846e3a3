//! User profile model.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plan::PlanTier;

/// Outcome of applying a plan change to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanChange {
    /// The requested plan was already active; nothing changed.
    Unchanged,
    /// The profile moved from free to pro.
    Upgraded,
}

/// Error raised by an invalid plan change.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanChangeError {
    #[error("downgrading from pro is not supported")]
    DowngradeNotSupported,
}

/// User profile stored in the record store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UserProfile {
    /// Auth-provider user id.
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub plan: PlanTier,
    pub created_at: DateTime<Utc>,
    /// Lifetime count of edits consumed; only ever increases.
    #[serde(default)]
    pub video_edits_used: u32,
    #[serde(default = "default_subscription_status")]
    pub subscription_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgraded_at: Option<DateTime<Utc>>,
}

fn default_subscription_status() -> String {
    "active".to_string()
}

impl UserProfile {
    /// Create a fresh free-plan profile.
    ///
    /// When no display name is given it defaults to the local part of the
    /// e-mail address.
    pub fn new(id: impl Into<String>, email: impl Into<String>, name: Option<String>) -> Self {
        let email = email.into();
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email_local_part(&email));
        Self {
            id: id.into(),
            email,
            name,
            plan: PlanTier::Free,
            created_at: Utc::now(),
            video_edits_used: 0,
            subscription_status: default_subscription_status(),
            upgraded_at: None,
        }
    }

    /// Apply a plan change request.
    ///
    /// Plan moves are one-directional (free to pro). Requesting the active
    /// plan is a no-op; a downgrade is rejected.
    pub fn change_plan(
        &mut self,
        plan: PlanTier,
        now: DateTime<Utc>,
    ) -> Result<PlanChange, PlanChangeError> {
        match (self.plan, plan) {
            (PlanTier::Free, PlanTier::Pro) => {
                self.plan = PlanTier::Pro;
                self.upgraded_at = Some(now);
                Ok(PlanChange::Upgraded)
            }
            (PlanTier::Pro, PlanTier::Free) => Err(PlanChangeError::DowngradeNotSupported),
            _ => Ok(PlanChange::Unchanged),
        }
    }

    /// Record one consumed edit.
    pub fn record_edit(&mut self) {
        self.video_edits_used += 1;
    }
}

/// Local part of an e-mail address, used as a default display name.
fn email_local_part(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_defaults() {
        let profile = UserProfile::new("user-1", "jo@example.com", None);
        assert_eq!(profile.plan, PlanTier::Free);
        assert_eq!(profile.video_edits_used, 0);
        assert_eq!(profile.subscription_status, "active");
        assert_eq!(profile.name, "jo");
        assert!(profile.upgraded_at.is_none());
    }

    #[test]
    fn test_new_profile_explicit_name() {
        let profile = UserProfile::new("user-1", "jo@example.com", Some("Jo Smith".to_string()));
        assert_eq!(profile.name, "Jo Smith");
    }

    #[test]
    fn test_new_profile_blank_name_falls_back() {
        let profile = UserProfile::new("user-1", "jo@example.com", Some("  ".to_string()));
        assert_eq!(profile.name, "jo");
    }

    #[test]
    fn test_upgrade_free_to_pro() {
        let mut profile = UserProfile::new("user-1", "jo@example.com", None);
        let now = Utc::now();

        let change = profile.change_plan(PlanTier::Pro, now).unwrap();
        assert_eq!(change, PlanChange::Upgraded);
        assert_eq!(profile.plan, PlanTier::Pro);
        assert_eq!(profile.upgraded_at, Some(now));
    }

    #[test]
    fn test_upgrade_is_idempotent() {
        let mut profile = UserProfile::new("user-1", "jo@example.com", None);
        let first = Utc::now();
        profile.change_plan(PlanTier::Pro, first).unwrap();

        let change = profile.change_plan(PlanTier::Pro, Utc::now()).unwrap();
        assert_eq!(change, PlanChange::Unchanged);
        // The original upgrade timestamp is preserved.
        assert_eq!(profile.upgraded_at, Some(first));
    }

    #[test]
    fn test_downgrade_rejected() {
        let mut profile = UserProfile::new("user-1", "jo@example.com", None);
        profile.change_plan(PlanTier::Pro, Utc::now()).unwrap();

        let err = profile.change_plan(PlanTier::Free, Utc::now()).unwrap_err();
        assert_eq!(err, PlanChangeError::DowngradeNotSupported);
        assert_eq!(profile.plan, PlanTier::Pro);
    }

    #[test]
    fn test_same_plan_noop_for_free() {
        let mut profile = UserProfile::new("user-1", "jo@example.com", None);
        let change = profile.change_plan(PlanTier::Free, Utc::now()).unwrap();
        assert_eq!(change, PlanChange::Unchanged);
        assert!(profile.upgraded_at.is_none());
    }

    #[test]
    fn test_record_edit_only_increases() {
        let mut profile = UserProfile::new("user-1", "jo@example.com", None);
        for expected in 1..=6 {
            profile.record_edit();
            assert_eq!(profile.video_edits_used, expected);
        }
    }
}
