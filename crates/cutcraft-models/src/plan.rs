//! Plan configuration and usage limits.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Upload size ceilings in bytes for each plan tier.
pub const FREE_UPLOAD_LIMIT_BYTES: u64 = 100 * 1024 * 1024; // 100 MB
pub const PRO_UPLOAD_LIMIT_BYTES: u64 = 1024 * 1024 * 1024; // 1 GB

/// Number of edits a free-plan user may consume before upgrading.
pub const FREE_EDIT_LIMIT: u32 = 5;

/// Amount charged for the pro upgrade.
pub const PRO_PLAN_PRICE: f64 = 29.00;

/// Plan tier enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
}

impl PlanTier {
    /// Parse a plan name (case-insensitive), rejecting unknown tiers.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "free" => Some(PlanTier::Free),
            "pro" => Some(PlanTier::Pro),
            _ => None,
        }
    }

    /// Get the upload size ceiling in bytes for this plan.
    pub fn upload_limit_bytes(&self) -> u64 {
        match self {
            PlanTier::Free => FREE_UPLOAD_LIMIT_BYTES,
            PlanTier::Pro => PRO_UPLOAD_LIMIT_BYTES,
        }
    }

    /// Get the plan name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Format bytes as a human-readable string (B, KB, MB, GB).
///
/// Whole multiples render without a fraction so limit messages read as
/// "100 MB" rather than "100.00 MB".
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    let (unit, name) = if bytes >= GB {
        (GB, "GB")
    } else if bytes >= MB {
        (MB, "MB")
    } else if bytes >= KB {
        (KB, "KB")
    } else {
        return format!("{} B", bytes);
    };

    if bytes % unit == 0 {
        format!("{} {}", bytes / unit, name)
    } else {
        format!("{:.2} {}", bytes as f64 / unit as f64, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_upload_limits() {
        assert_eq!(PlanTier::Free.upload_limit_bytes(), 100 * 1024 * 1024);
        assert_eq!(PlanTier::Pro.upload_limit_bytes(), 1024 * 1024 * 1024);
    }

    #[test]
    fn test_plan_parse_strict() {
        assert_eq!(PlanTier::parse("free"), Some(PlanTier::Free));
        assert_eq!(PlanTier::parse("pro"), Some(PlanTier::Pro));
        assert_eq!(PlanTier::parse("PRO"), Some(PlanTier::Pro));
        assert_eq!(PlanTier::parse("studio"), None);
        assert_eq!(PlanTier::parse(""), None);
    }

    #[test]
    fn test_plan_serde_names() {
        assert_eq!(serde_json::to_string(&PlanTier::Free).unwrap(), "\"free\"");
        assert_eq!(serde_json::to_string(&PlanTier::Pro).unwrap(), "\"pro\"");
        let parsed: PlanTier = serde_json::from_str("\"pro\"").unwrap();
        assert_eq!(parsed, PlanTier::Pro);
    }

    #[test]
    fn test_format_bytes_whole_units() {
        assert_eq!(format_bytes(100 * 1024 * 1024), "100 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1 GB");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(500), "500 B");
    }

    #[test]
    fn test_format_bytes_fractional() {
        assert_eq!(format_bytes(1024 + 512), "1.50 KB");
        assert_eq!(format_bytes(2 * 1024 * 1024 + 512 * 1024), "2.50 MB");
    }
}
