//! Trial and day-count arithmetic
//!
//! Both instants are compared as absolute UTC times. A "day" is a fixed
//! 86 400 000 ms span, not a calendar day in the user's timezone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Profile, SubscriptionStatus};

pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Trial lifecycle as seen at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialState {
    /// No trial end recorded
    None,
    Active,
    Expired,
}

/// Display data for a trial end timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialInfo {
    pub is_active: bool,
    pub days_remaining: u32,
    pub status: TrialState,
}

impl TrialInfo {
    const NONE: TrialInfo = TrialInfo {
        is_active: false,
        days_remaining: 0,
        status: TrialState::None,
    };

    const EXPIRED: TrialInfo = TrialInfo {
        is_active: false,
        days_remaining: 0,
        status: TrialState::Expired,
    };
}

/// Whole days from `now` until `end`, rounded up, never negative.
///
/// `end == now` yields 0.
pub fn days_until(end: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let remaining_ms = end.timestamp_millis().saturating_sub(now.timestamp_millis());
    if remaining_ms <= 0 {
        return 0;
    }
    let days = (remaining_ms - 1) / MILLIS_PER_DAY + 1;
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Trial state for an optional end instant
pub fn trial_info_at(ends_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> TrialInfo {
    let Some(end) = ends_at else {
        return TrialInfo::NONE;
    };

    let days_remaining = days_until(end, now);
    if days_remaining > 0 {
        TrialInfo {
            is_active: true,
            days_remaining,
            status: TrialState::Active,
        }
    } else {
        TrialInfo::EXPIRED
    }
}

/// Trial state of a stored profile.
///
/// `trial_ends_at` only counts while the status is `trialing`; it is kept after
/// an upgrade or a billing change and must be ignored then. A trialing profile
/// with no end agrees with the resolver and reads as expired.
pub fn trial_info_for(profile: &Profile, now: DateTime<Utc>) -> TrialInfo {
    if profile.subscription_status != SubscriptionStatus::Trialing {
        return TrialInfo::NONE;
    }
    match profile.trial_ends_at {
        Some(end) => trial_info_at(Some(end), now),
        None => TrialInfo::EXPIRED,
    }
}

/// Trial state for an optional ISO-8601 timestamp string.
///
/// A value that does not parse is treated as an expired trial.
pub fn parse_trial_info(ends_at: Option<&str>, now: DateTime<Utc>) -> TrialInfo {
    let Some(raw) = ends_at.map(str::trim).filter(|s| !s.is_empty()) else {
        return TrialInfo::NONE;
    };

    match DateTime::parse_from_rfc3339(raw) {
        Ok(end) => trial_info_at(Some(end.with_timezone(&Utc)), now),
        Err(e) => {
            tracing::debug!(value = raw, error = %e, "Unparseable trial end timestamp");
            TrialInfo::EXPIRED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::{AccessStatus, SubscriptionTier, resolve_at};
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_days_until_exact_days() {
        assert_eq!(days_until(now() + Duration::days(3), now()), 3);
        assert_eq!(days_until(now() + Duration::days(1), now()), 1);
    }

    #[test]
    fn test_days_until_rounds_up() {
        assert_eq!(days_until(now() + Duration::milliseconds(1), now()), 1);
        assert_eq!(days_until(now() + Duration::hours(25), now()), 2);
        assert_eq!(
            days_until(now() + Duration::days(2) - Duration::milliseconds(1), now()),
            2
        );
    }

    #[test]
    fn test_days_until_never_negative() {
        assert_eq!(days_until(now(), now()), 0);
        assert_eq!(days_until(now() - Duration::days(2), now()), 0);
    }

    #[test]
    fn test_trial_info_none() {
        let info = trial_info_at(None, now());
        assert!(!info.is_active);
        assert_eq!(info.days_remaining, 0);
        assert_eq!(info.status, TrialState::None);
    }

    #[test]
    fn test_trial_info_boundary_is_expired() {
        let info = trial_info_at(Some(now()), now());
        assert!(!info.is_active);
        assert_eq!(info.status, TrialState::Expired);
    }

    #[test]
    fn test_trial_info_active() {
        let info = trial_info_at(Some(now() + Duration::hours(5)), now());
        assert!(info.is_active);
        assert_eq!(info.days_remaining, 1);
        assert_eq!(info.status, TrialState::Active);
    }

    fn trialing(ends_at: Option<DateTime<Utc>>) -> Profile {
        Profile {
            subscription_status: SubscriptionStatus::Trialing,
            has_used_trial: true,
            trial_ends_at: ends_at,
            ..Profile::new("user-1")
        }
    }

    #[test]
    fn test_trial_info_for_running_trial() {
        let info = trial_info_for(&trialing(Some(now() + Duration::days(4))), now());
        assert!(info.is_active);
        assert_eq!(info.days_remaining, 4);
        assert_eq!(info.status, TrialState::Active);
    }

    #[test]
    fn test_trial_info_for_ignores_stale_end_after_upgrade() {
        let mut profile = trialing(Some(now() + Duration::days(4)));
        profile.subscription_status = SubscriptionStatus::Active;
        profile.subscription_tier = SubscriptionTier::Pro;

        let info = trial_info_for(&profile, now());
        assert!(!info.is_active);
        assert_eq!(info.days_remaining, 0);
        assert_eq!(info.status, TrialState::None);
    }

    #[test]
    fn test_trial_info_for_agrees_with_resolver() {
        for ends_at in [None, Some(now()), Some(now() - Duration::days(2))] {
            let profile = trialing(ends_at);
            let info = trial_info_for(&profile, now());
            assert!(!info.is_active);
            assert_eq!(info.status, TrialState::Expired);
            assert_eq!(resolve_at(Some(&profile), now()).status, AccessStatus::Expired);
        }
    }

    #[test]
    fn test_parse_trial_info_offsets() {
        // Same instant written with an offset
        let info = parse_trial_info(Some("2026-10-21T14:00:00+02:00"), now());
        assert_eq!(info.days_remaining, 3);
        assert!(info.is_active);
    }

    #[test]
    fn test_parse_trial_info_garbage() {
        let info = parse_trial_info(Some("next tuesday"), now());
        assert!(!info.is_active);
        assert_eq!(info.status, TrialState::Expired);

        assert_eq!(parse_trial_info(Some("   "), now()).status, TrialState::None);
        assert_eq!(parse_trial_info(None, now()).status, TrialState::None);
    }

    #[test]
    fn test_trial_info_serialize() {
        let info = trial_info_at(Some(now() + Duration::days(2)), now());
        let json = serde_json::to_value(info).unwrap();
        assert_eq!(json["is_active"], true);
        assert_eq!(json["days_remaining"], 2);
        assert_eq!(json["status"], "active");
    }
}
