//! API routes for shopbot-cloud

pub mod billing_webhook;
pub mod health;
pub mod subscription;

use crate::auth::rate_limit::trial_rate_limit;
use crate::auth::user_auth::user_auth_middleware;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Trial start (rate limited per IP)
    let trial_start = Router::new()
        .route(
            "/api/subscription/trial/start",
            post(subscription::start_trial),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            trial_rate_limit,
        ));

    // Subscription API (user JWT)
    let user = Router::new()
        .route("/api/subscription/access", get(subscription::get_access))
        .route("/api/subscription/trial", get(subscription::get_trial))
        .route("/api/subscription/quota", get(subscription::get_quota))
        .merge(trial_start)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            user_auth_middleware,
        ));

    // Billing webhook (signature-verified, raw body)
    let webhook = Router::new().route("/billing/webhook", post(billing_webhook::handle_webhook));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(user)
        .merge(webhook)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
