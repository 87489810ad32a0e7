//! Application error and its JSON body

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// Every shopbot-cloud handler failure ends up as one of these.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional context for the dashboard (offending field, value, ...)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }
}

/// JSON body of an error response: `{code, message, details?}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        if self.code.category() == ErrorCategory::System {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (self.http_status(), Json(ErrorBody::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::TrialAlreadyUsed);
        assert_eq!(err.code, ErrorCode::TrialAlreadyUsed);
        assert_eq!(err.message, "Free trial has already been used");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::new(ErrorCode::InvalidTier)
            .with_detail("tier", "platinum")
            .with_detail("max", 90);

        let details = err.details.unwrap();
        assert_eq!(details.get("tier").unwrap(), "platinum");
        assert_eq!(details.get("max").unwrap(), 90);
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::invalid_token("Invalid or expired token");
        assert_eq!(format!("{}", err), "Invalid or expired token");
    }

    #[test]
    fn test_error_body_serialize() {
        let err = AppError::new(ErrorCode::TrialAlreadyUsed).with_detail("user_id", "u-1");
        let json = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(json["code"], 3002);
        assert_eq!(json["message"], "Free trial has already been used");
        assert_eq!(json["details"]["user_id"], "u-1");

        let json = serde_json::to_string(&ErrorBody::from(&AppError::token_expired())).unwrap();
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::new(ErrorCode::SubscriptionAlreadyActive).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = AppError::not_authenticated().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
