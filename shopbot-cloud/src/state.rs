//! Application state for shopbot-cloud

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool (profile provider)
    pub pool: PgPool,
    /// HS256 secret for verifying user tokens
    pub jwt_secret: String,
    /// Billing webhook signing secret
    pub billing_webhook_secret: String,
    /// Free trial length
    pub trial_length: chrono::Duration,
    /// Rate limiter for trial start
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Create a new AppState, running migrations
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::with_pool(pool, config))
    }

    /// Build state around an existing pool (no connection is made here)
    pub fn with_pool(pool: PgPool, config: &Config) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            billing_webhook_secret: config.billing_webhook_secret.clone(),
            trial_length: chrono::Duration::days(config.trial_days),
            rate_limiter: RateLimiter::new(),
        }
    }
}
