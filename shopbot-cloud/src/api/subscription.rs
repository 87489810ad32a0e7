//! Subscription access API
//!
//! All handlers run behind `user_auth_middleware`; the caller's profile is
//! created on first access.

use axum::{Extension, Json, extract::State};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::subscription::{
    AccessStatus, Profile, SubscriptionAccessResult, SubscriptionTier, TierQuota, TrialInfo,
    quota_for, resolve_at, trial_info_for,
};
use shared::util::datetime_to_millis;

use crate::auth::UserIdentity;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct QuotaResponse {
    pub tier: SubscriptionTier,
    pub quota: TierQuota,
    /// Free tier in effect, so the dashboard offers plans
    pub upgrade_available: bool,
}

/// GET /api/subscription/access
pub async fn get_access(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ServiceResult<Json<SubscriptionAccessResult>> {
    let now = chrono::Utc::now();
    let profile =
        db::profiles::get_or_create(&state.pool, &identity.user_id, datetime_to_millis(now))
            .await?;
    Ok(Json(resolve_at(Some(&profile), now)))
}

/// GET /api/subscription/trial
pub async fn get_trial(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ServiceResult<Json<TrialInfo>> {
    let now = chrono::Utc::now();
    let profile =
        db::profiles::get_or_create(&state.pool, &identity.user_id, datetime_to_millis(now))
            .await?;
    Ok(Json(trial_info_for(&profile, now)))
}

/// POST /api/subscription/trial/start
pub async fn start_trial(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ServiceResult<Json<SubscriptionAccessResult>> {
    let now = chrono::Utc::now();
    let now_ms = datetime_to_millis(now);
    let profile = db::profiles::get_or_create(&state.pool, &identity.user_id, now_ms).await?;

    if let Some(code) = trial_rejection(&profile, &resolve_at(Some(&profile), now)) {
        return Err(AppError::new(code).into());
    }

    let ends_at = now + state.trial_length;
    let Some(profile) =
        db::profiles::start_trial(&state.pool, &identity.user_id, ends_at, now_ms).await?
    else {
        // Lost a race against a concurrent start
        return Err(AppError::new(ErrorCode::TrialAlreadyUsed).into());
    };

    tracing::info!(
        user_id = %identity.user_id,
        email = %identity.email,
        trial_ends_at = %ends_at,
        "Trial started"
    );

    Ok(Json(resolve_at(Some(&profile), now)))
}

/// GET /api/subscription/quota
pub async fn get_quota(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ServiceResult<Json<QuotaResponse>> {
    let now = chrono::Utc::now();
    let profile =
        db::profiles::get_or_create(&state.pool, &identity.user_id, datetime_to_millis(now))
            .await?;
    let access = resolve_at(Some(&profile), now);
    Ok(Json(QuotaResponse {
        tier: access.tier,
        quota: quota_for(access.tier),
        upgrade_available: access.should_prompt_upgrade(),
    }))
}

/// Why a profile may not start a trial, if it may not.
///
/// Lapsed trials keep the stored `trialing` status, so the resolved status
/// decides between "already active" and "trial used".
fn trial_rejection(profile: &Profile, access: &SubscriptionAccessResult) -> Option<ErrorCode> {
    if profile.can_start_trial() {
        return None;
    }
    match access.status {
        AccessStatus::Trialing | AccessStatus::Active => Some(ErrorCode::SubscriptionAlreadyActive),
        _ => Some(ErrorCode::TrialAlreadyUsed),
    }
}
