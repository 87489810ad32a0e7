//! Database access layer

pub mod billing_events;
pub mod profiles;
