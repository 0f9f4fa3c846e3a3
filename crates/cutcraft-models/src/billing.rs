//! Billing history records.
//!
//! Records are append-only: one entry is written per successful free-to-pro
//! upgrade and never mutated afterwards.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::plan::{PlanTier, PRO_PLAN_PRICE};

/// An append-only billing entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BillingRecord {
    pub user_id: String,
    pub amount: f64,
    pub plan: PlanTier,
    pub status: String,
    pub date: DateTime<Utc>,
}

impl BillingRecord {
    /// Entry for a pro upgrade charge.
    pub fn pro_upgrade(user_id: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            amount: PRO_PLAN_PRICE,
            plan: PlanTier::Pro,
            status: "paid".to_string(),
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pro_upgrade_record() {
        let date = Utc::now();
        let record = BillingRecord::pro_upgrade("user-1", date);
        assert_eq!(record.user_id, "user-1");
        assert_eq!(record.amount, 29.00);
        assert_eq!(record.plan, PlanTier::Pro);
        assert_eq!(record.status, "paid");
        assert_eq!(record.date, date);
    }
}
