//! Unified error system for Shopbot
//!
//! - [`ErrorCode`]: numeric codes shared with the dashboard
//! - [`ErrorCategory`]: classification by code range
//! - [`AppError`]: error with code, message and details
//! - [`ErrorBody`]: JSON body of error responses
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::TrialAlreadyUsed)
//!     .with_detail("user_id", "user-1");
//!
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code.code(), 3002);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::ErrorCode;
pub use types::{AppError, ErrorBody};
