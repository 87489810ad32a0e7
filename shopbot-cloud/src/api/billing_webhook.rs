//! Billing webhook handler
//!
//! POST /billing/webhook: raw body, HMAC-verified before anything is parsed

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use shared::error::{AppError, ErrorCode};
use shared::util::now_millis;

use crate::billing::{self, BillingAction, BillingEvent};
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ServiceResult<StatusCode> {
    let sig_header = headers
        .get("billing-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing billing-signature header");
            AppError::with_message(
                ErrorCode::BillingSignatureInvalid,
                "Missing billing-signature header",
            )
        })?;

    billing::verify_webhook_signature(
        &body,
        sig_header,
        &state.billing_webhook_secret,
        chrono::Utc::now().timestamp(),
    )
    .map_err(|e| {
        tracing::warn!(error = e, "Billing webhook signature verification failed");
        AppError::with_message(ErrorCode::BillingSignatureInvalid, e)
    })?;

    let event: BillingEvent = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(%e, "Failed to parse billing event");
        AppError::with_message(ErrorCode::BillingEventInvalid, "Malformed billing event")
    })?;

    tracing::info!(event_id = %event.id, event_type = %event.event_type, "Received billing webhook");

    let update = match event.action() {
        Ok(BillingAction::Apply(update)) => update,
        Ok(BillingAction::Ignore) => {
            tracing::debug!(event_type = %event.event_type, "Unhandled billing event type");
            return Ok(StatusCode::OK);
        }
        Err(e) => {
            tracing::warn!(event_id = %event.id, error = %e, "Rejected billing event");
            return Err(e.into());
        }
    };

    let user_id = event.data.user_id.as_str();
    let now = now_millis();

    // Idempotency: INSERT first, a second delivery finds the row
    if !db::billing_events::record(&state.pool, &event.id, &event.event_type, user_id, now).await? {
        tracing::info!(event_id = %event.id, "Duplicate billing event, skipping");
        return Ok(StatusCode::OK);
    }

    let applied = async {
        db::profiles::get_or_create(&state.pool, user_id, now).await?;
        db::profiles::apply_billing_update(&state.pool, user_id, &update, now).await
    }
    .await;

    if let Err(e) = applied {
        // Let the provider's retry run the event again
        if let Err(release) = db::billing_events::forget(&state.pool, &event.id).await {
            tracing::error!(event_id = %event.id, %release, "Failed to release billing event");
        }
        return Err(e.into());
    }

    tracing::info!(
        event_id = %event.id,
        user_id = %user_id,
        status = %update.status.as_db(),
        tier = ?update.tier,
        "Billing event applied"
    );
    Ok(StatusCode::OK)
}
