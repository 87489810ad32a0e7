//! Error codes returned by shopbot-cloud
//!
//! Codes are grouped by range:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Subscription errors
//! - 9xxx: System errors
//!
//! Values are part of the dashboard contract; retired codes are not reused.

use serde::Serialize;
use std::fmt;

/// Error code, serialized as its u16 value so the dashboard can look it up
/// in its i18n table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Too many requests from one client
    TooManyRequests = 9,

    // ==================== 1xxx: Auth ====================
    /// No bearer token on the request
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 3xxx: Subscription ====================
    /// Trial has already been used on this profile
    TrialAlreadyUsed = 3002,
    /// User already has an active subscription or running trial
    SubscriptionAlreadyActive = 3003,
    /// Unknown subscription tier
    InvalidTier = 3004,
    /// Billing webhook signature missing or rejected
    BillingSignatureInvalid = 3005,
    /// Billing event payload could not be applied
    BillingEventInvalid = 3006,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default English message for this code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::TooManyRequests => "Too many requests, try again later",
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::TrialAlreadyUsed => "Free trial has already been used",
            ErrorCode::SubscriptionAlreadyActive => "Subscription is already active",
            ErrorCode::InvalidTier => "Unknown subscription tier",
            ErrorCode::BillingSignatureInvalid => "Billing signature verification failed",
            ErrorCode::BillingEventInvalid => "Billing event could not be applied",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::TooManyRequests.code(), 9);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::TrialAlreadyUsed.code(), 3002);
        assert_eq!(ErrorCode::BillingSignatureInvalid.code(), 3005);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::TrialAlreadyUsed).unwrap();
        assert_eq!(json, "3002");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::InvalidTier), "3004");
    }

    #[test]
    fn test_message() {
        assert_eq!(
            ErrorCode::TrialAlreadyUsed.message(),
            "Free trial has already been used"
        );
        assert_eq!(ErrorCode::InternalError.message(), "Internal server error");
    }
}
