//! Profile provider: per-user billing and trial state
//!
//! Status and tier are stored as lowercase TEXT, timestamps as Unix millis.
//! Rows with values this build does not understand still load: unknown
//! statuses become `Unrecognized`, unknown tiers become `free`.

use shared::subscription::{Profile, SubscriptionStatus, SubscriptionTier};
use shared::util::{datetime_to_millis, millis_to_datetime};
use sqlx::PgPool;

const PROFILE_COLUMNS: &str = "id, subscription_status, subscription_tier, has_used_trial,
    trial_ends_at, subscription_ends_at";

#[derive(Debug, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: String,
    pub subscription_status: String,
    pub subscription_tier: String,
    pub has_used_trial: bool,
    pub trial_ends_at: Option<i64>,
    pub subscription_ends_at: Option<i64>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        let subscription_status = SubscriptionStatus::from_db(&row.subscription_status);
        if subscription_status == SubscriptionStatus::Unrecognized {
            tracing::warn!(
                user_id = %row.id,
                status = %row.subscription_status,
                "Unrecognized subscription status in profile"
            );
        }

        let subscription_tier = SubscriptionTier::from_db(&row.subscription_tier)
            .unwrap_or_else(|| {
                tracing::warn!(
                    user_id = %row.id,
                    tier = %row.subscription_tier,
                    "Unknown subscription tier in profile, using free"
                );
                SubscriptionTier::Free
            });

        Profile {
            subscription_status,
            subscription_tier,
            has_used_trial: row.has_used_trial,
            trial_ends_at: row.trial_ends_at.and_then(millis_to_datetime),
            subscription_ends_at: row.subscription_ends_at.and_then(millis_to_datetime),
            id: row.id,
        }
    }
}

/// Fetch the profile, creating the signup default if none exists.
///
/// Idempotent: concurrent first requests for the same user create one row.
pub async fn get_or_create(pool: &PgPool, user_id: &str, now: i64) -> Result<Profile, sqlx::Error> {
    let inserted = sqlx::query(
        "INSERT INTO profiles (id, subscription_status, subscription_tier, has_used_trial, created_at, updated_at)
         VALUES ($1, 'none', 'free', FALSE, $2, $2)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await?;

    if inserted.rows_affected() > 0 {
        tracing::info!(user_id = %user_id, "Created profile");
    }

    let row: ProfileRow =
        sqlx::query_as(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"))
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    Ok(row.into())
}

/// Start a trial in one conditional update.
///
/// Returns `None` when the profile already used its trial or is active/trialing,
/// so two concurrent requests cannot both start one.
pub async fn start_trial(
    pool: &PgPool,
    user_id: &str,
    trial_ends_at: chrono::DateTime<chrono::Utc>,
    now: i64,
) -> Result<Option<Profile>, sqlx::Error> {
    let row: Option<ProfileRow> = sqlx::query_as(&format!(
        "UPDATE profiles
         SET subscription_status = 'trialing', has_used_trial = TRUE,
             trial_ends_at = $2, updated_at = $3
         WHERE id = $1 AND has_used_trial = FALSE
           AND subscription_status NOT IN ('active', 'trialing', 'trial')
         RETURNING {PROFILE_COLUMNS}"
    ))
    .bind(user_id)
    .bind(datetime_to_millis(trial_ends_at))
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Profile::from))
}

/// Billing-provider view of a subscription, applied on top of a profile
#[derive(Debug)]
pub struct BillingUpdate {
    pub status: SubscriptionStatus,
    /// `None` keeps the stored tier
    pub tier: Option<SubscriptionTier>,
    /// `None` keeps the stored end
    pub subscription_ends_at: Option<i64>,
}

/// Apply a billing sync. Never touches `has_used_trial` or `trial_ends_at`.
pub async fn apply_billing_update(
    pool: &PgPool,
    user_id: &str,
    update: &BillingUpdate,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE profiles
         SET subscription_status = $2,
             subscription_tier = COALESCE($3, subscription_tier),
             subscription_ends_at = COALESCE($4, subscription_ends_at),
             updated_at = $5
         WHERE id = $1",
    )
    .bind(user_id)
    .bind(update.status.as_db())
    .bind(update.tier.map(|t| t.as_str()))
    .bind(update.subscription_ends_at)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, tier: &str) -> ProfileRow {
        ProfileRow {
            id: "user-1".into(),
            subscription_status: status.into(),
            subscription_tier: tier.into(),
            has_used_trial: true,
            trial_ends_at: Some(1_767_225_600_000),
            subscription_ends_at: None,
        }
    }

    #[test]
    fn test_row_to_profile() {
        let profile: Profile = row("trial", "pro").into();
        assert_eq!(profile.id, "user-1");
        assert_eq!(profile.subscription_status, SubscriptionStatus::Trialing);
        assert_eq!(profile.subscription_tier, SubscriptionTier::Pro);
        assert!(profile.has_used_trial);
        assert_eq!(
            profile.trial_ends_at.map(|t| t.timestamp_millis()),
            Some(1_767_225_600_000)
        );
        assert!(profile.subscription_ends_at.is_none());
    }

    #[test]
    fn test_row_with_unknown_values_degrades() {
        let profile: Profile = row("on_hold", "platinum").into();
        assert_eq!(profile.subscription_status, SubscriptionStatus::Unrecognized);
        assert_eq!(profile.subscription_tier, SubscriptionTier::Free);
    }

    #[test]
    fn test_row_with_out_of_range_timestamp() {
        let mut r = row("active", "basic");
        r.subscription_ends_at = Some(i64::MAX);
        let profile: Profile = r.into();
        assert!(profile.subscription_ends_at.is_none());
    }
}
