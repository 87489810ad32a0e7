//! Shared types for Shopbot
//!
//! Domain types used across the workspace: the subscription/trial/tier model
//! and its access resolver, the unified error system, and time helpers.

pub mod error;
pub mod subscription;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
pub use subscription::{Profile, SubscriptionAccessResult, SubscriptionStatus, SubscriptionTier};
