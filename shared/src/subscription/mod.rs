//! Subscription, trial and tier model
//!
//! The profile is owned by the storage layer (shopbot-cloud `db::profiles`).
//! Everything in this module only reads it:
//! - [`resolver`]: computes effective access from a profile
//! - [`trial`]: trial/date arithmetic
//! - [`features`]: static tier → capability and tier → quota tables

pub mod features;
pub mod resolver;
pub mod trial;

pub use features::{Feature, TierQuota, features_for, quota_for};
pub use resolver::{AccessStatus, SubscriptionAccessResult, resolve, resolve_at};
pub use trial::{
    TrialInfo, TrialState, days_until, parse_trial_info, trial_info_at, trial_info_for,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored subscription status
///
/// `trialing` is the canonical trial label. Older rows and billing payloads
/// still carry `trial`, which parses to the same variant and is never written
/// back. Strings outside the known set parse to [`SubscriptionStatus::Unrecognized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    /// Fresh signup, nothing purchased
    None,
    /// Offered a trial but has not started one
    Eligible,
    /// Trial running (or ran and has since lapsed, see `trial_ends_at`)
    Trialing,
    /// Paid subscription in good standing
    Active,
    /// Paid subscription ran out
    Expired,
    /// Paid subscription cancelled by the user or billing provider
    Cancelled,
    /// Anything the storage layer holds that we do not know about
    Unrecognized,
}

impl SubscriptionStatus {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Self::None,
            "eligible" => Self::Eligible,
            "trialing" | "trial" => Self::Trialing,
            "active" => Self::Active,
            "expired" => Self::Expired,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Unrecognized,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Eligible => "eligible",
            Self::Trialing => "trialing",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Can a trial be started from this status?
    ///
    /// Only meaningful together with `has_used_trial == false`.
    pub fn can_start_trial(&self) -> bool {
        !matches!(self, Self::Trialing | Self::Active)
    }
}

impl From<String> for SubscriptionStatus {
    fn from(s: String) -> Self {
        Self::from_db(&s)
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        status.as_db().to_string()
    }
}

/// Feature tier
///
/// Ordered from least to most capable, so `Ord` doubles as an upgrade check.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Basic,
    Pro,
    Ultra,
    Enterprise,
}

impl SubscriptionTier {
    /// All tiers, lowest first
    pub const ALL: [SubscriptionTier; 5] = [
        SubscriptionTier::Free,
        SubscriptionTier::Basic,
        SubscriptionTier::Pro,
        SubscriptionTier::Ultra,
        SubscriptionTier::Enterprise,
    ];

    /// Tier granted to every running trial, regardless of the stored tier
    pub const TRIAL: SubscriptionTier = SubscriptionTier::Ultra;

    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Self::Free),
            "basic" => Some(Self::Basic),
            "pro" => Some(Self::Pro),
            "ultra" => Some(Self::Ultra),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Ultra => "ultra",
            Self::Enterprise => "enterprise",
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, Self::Free)
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user billing and trial record
///
/// Created at signup with [`Profile::new`], updated only by trial start and
/// billing sync. `has_used_trial` never goes back to `false` once set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Opaque user identifier (identity provider subject)
    pub id: String,
    pub subscription_status: SubscriptionStatus,
    pub subscription_tier: SubscriptionTier,
    #[serde(default)]
    pub has_used_trial: bool,
    /// Only meaningful while the status is a trial; kept after expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_ends_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_ends_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Default profile for a user seen for the first time
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subscription_status: SubscriptionStatus::None,
            subscription_tier: SubscriptionTier::Free,
            has_used_trial: false,
            trial_ends_at: None,
            subscription_ends_at: None,
        }
    }

    /// Whether [`SubscriptionStatus::can_start_trial`] holds and the trial is unused
    pub fn can_start_trial(&self) -> bool {
        !self.has_used_trial && self.subscription_status.can_start_trial()
    }
}
