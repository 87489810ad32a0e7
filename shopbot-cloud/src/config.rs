//! Service configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Allowed range for `TRIAL_DAYS`
const TRIAL_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=90;

/// shopbot-cloud configuration, read from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 secret shared with the identity provider
    pub jwt_secret: String,
    /// HMAC secret for billing webhook signatures
    pub billing_webhook_secret: String,
    /// Length of a free trial in days
    pub trial_days: i64,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_trial_days(raw: Option<String>) -> Result<i64, BoxError> {
        let Some(raw) = raw else {
            return Ok(7);
        };
        let days: i64 = raw
            .trim()
            .parse()
            .map_err(|_| format!("TRIAL_DAYS must be an integer, got {raw:?}"))?;
        if !TRIAL_DAYS_RANGE.contains(&days) {
            return Err(format!(
                "TRIAL_DAYS must be between {} and {}, got {days}",
                TRIAL_DAYS_RANGE.start(),
                TRIAL_DAYS_RANGE.end()
            )
            .into());
        }
        Ok(days)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: environment.clone(),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            billing_webhook_secret: Self::require_secret("BILLING_WEBHOOK_SECRET", &environment)?,
            trial_days: Self::parse_trial_days(std::env::var("TRIAL_DAYS").ok())?,
        })
    }
}
