//! API middleware.
//!
//! Only the rate limiter lives here; authentication and session handling
//! belong to the surrounding platform, not this service.

pub mod rate;
