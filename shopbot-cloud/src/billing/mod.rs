//! Billing provider integration: webhook signature and event payloads

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use shared::error::{AppError, ErrorCode};
use shared::subscription::{SubscriptionStatus, SubscriptionTier};

use crate::db::profiles::BillingUpdate;

/// Maximum accepted distance between the signed timestamp and now
const SIGNATURE_TOLERANCE_SECS: u64 = 300;

/// Verify a `billing-signature: t=<secs>,v1=<hex>` header against the raw body.
///
/// The MAC covers `"{t}.{body}"`. Comparison is constant-time.
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    now_secs: i64,
) -> Result<(), &'static str> {
    let mut timestamp = "";
    let mut signature = "";
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signature = v;
        }
    }

    if timestamp.is_empty() || signature.is_empty() {
        return Err("Invalid billing-signature header");
    }

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    let sig_bytes = hex::decode(signature).map_err(|_| "Invalid signature hex")?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "Webhook signature mismatch")?;

    let ts: i64 = timestamp.parse().map_err(|_| "Invalid timestamp")?;
    if now_secs.abs_diff(ts) > SIGNATURE_TOLERANCE_SECS {
        return Err("Webhook timestamp outside tolerance");
    }

    Ok(())
}

/// Webhook event envelope
#[derive(Debug, Deserialize)]
pub struct BillingEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: BillingEventData,
}

#[derive(Debug, Default, Deserialize)]
pub struct BillingEventData {
    #[serde(default)]
    pub user_id: String,
    pub tier: Option<String>,
    /// Unix seconds
    pub current_period_end: Option<i64>,
}

/// What a webhook event asks the profile store to do
#[derive(Debug)]
pub enum BillingAction {
    Apply(BillingUpdate),
    /// Event type this service does not act on
    Ignore,
}

impl BillingEvent {
    /// Translate the event into a profile update, validating its payload
    pub fn action(&self) -> Result<BillingAction, AppError> {
        let status = match self.event_type.as_str() {
            "subscription.activated" | "subscription.updated" => SubscriptionStatus::Active,
            "subscription.cancelled" => SubscriptionStatus::Cancelled,
            "subscription.expired" => SubscriptionStatus::Expired,
            _ => return Ok(BillingAction::Ignore),
        };

        if self.data.user_id.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::BillingEventInvalid,
                "Event has no user_id",
            ));
        }

        let tier = match self.data.tier.as_deref() {
            Some(raw) => Some(SubscriptionTier::from_db(raw).ok_or_else(|| {
                AppError::new(ErrorCode::InvalidTier).with_detail("tier", raw)
            })?),
            None => None,
        };
        if self.event_type == "subscription.activated" && tier.is_none() {
            return Err(AppError::with_message(
                ErrorCode::InvalidTier,
                "Activation event requires a tier",
            ));
        }

        let subscription_ends_at = match self.data.current_period_end {
            Some(secs) => Some(secs.checked_mul(1000).filter(|ms| *ms > 0).ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::BillingEventInvalid,
                    "current_period_end out of range",
                )
            })?),
            None => None,
        };

        Ok(BillingAction::Apply(BillingUpdate {
            status,
            // Cancellation and expiry keep the stored tier
            tier: if status == SubscriptionStatus::Active { tier } else { None },
            subscription_ends_at,
        }))
    }
}
