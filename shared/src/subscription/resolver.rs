//! Subscription access resolution
//!
//! Turns a stored [`Profile`] into the effective tier and feature set for the
//! current request. Resolution never fails: a missing or odd profile degrades
//! to the free tier with access still granted. The result drives upgrade
//! prompts and quota selection; it is not an authorization check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::features::{Feature, features_for};
use super::trial::days_until;
use super::{Profile, SubscriptionStatus, SubscriptionTier};

/// Normalized status label for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessStatus {
    None,
    Eligible,
    Trialing,
    Active,
    /// Trial ran out
    Expired,
    /// Paid plan lapsed or status unknown
    Free,
}

impl AccessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Eligible => "eligible",
            Self::Trialing => "trialing",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Free => "free",
        }
    }
}

/// Effective access for one request, recomputed every time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionAccessResult {
    pub has_access: bool,
    pub tier: SubscriptionTier,
    pub status: AccessStatus,
    pub features: Vec<Feature>,
    /// Trial days left while trialing, days to `subscription_ends_at` while active, else 0
    pub days_remaining: u32,
}

impl SubscriptionAccessResult {
    fn granted(tier: SubscriptionTier, status: AccessStatus, days_remaining: u32) -> Self {
        Self {
            has_access: true,
            tier,
            status,
            features: features_for(tier).to_vec(),
            days_remaining,
        }
    }

    fn free(status: AccessStatus) -> Self {
        Self::granted(SubscriptionTier::Free, status, 0)
    }

    /// True when the UI should offer an upgrade
    pub fn should_prompt_upgrade(&self) -> bool {
        !self.tier.is_paid()
    }
}

/// Resolve access at the current instant
pub fn resolve(profile: Option<&Profile>) -> SubscriptionAccessResult {
    resolve_at(profile, Utc::now())
}

/// Resolve access at `now`. First matching rule wins.
pub fn resolve_at(profile: Option<&Profile>, now: DateTime<Utc>) -> SubscriptionAccessResult {
    let Some(profile) = profile else {
        return SubscriptionAccessResult::free(AccessStatus::None);
    };

    let result = match profile.subscription_status {
        SubscriptionStatus::Trialing => {
            let days = profile
                .trial_ends_at
                .map(|end| days_until(end, now))
                .unwrap_or(0);
            if days > 0 {
                SubscriptionAccessResult::granted(
                    SubscriptionTier::TRIAL,
                    AccessStatus::Trialing,
                    days,
                )
            } else {
                SubscriptionAccessResult::free(AccessStatus::Expired)
            }
        }
        SubscriptionStatus::Active => {
            let days = profile
                .subscription_ends_at
                .map(|end| days_until(end, now))
                .unwrap_or(0);
            SubscriptionAccessResult::granted(profile.subscription_tier, AccessStatus::Active, days)
        }
        SubscriptionStatus::None => SubscriptionAccessResult::free(AccessStatus::None),
        SubscriptionStatus::Eligible => SubscriptionAccessResult::free(AccessStatus::Eligible),
        SubscriptionStatus::Expired
        | SubscriptionStatus::Cancelled
        | SubscriptionStatus::Unrecognized => SubscriptionAccessResult::free(AccessStatus::Free),
    };

    tracing::trace!(
        user_id = %profile.id,
        stored_status = profile.subscription_status.as_db(),
        tier = %result.tier,
        status = result.status.as_str(),
        "Resolved subscription access"
    );

    result
}
