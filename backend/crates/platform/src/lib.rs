//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Fixed-window rate limiting with stale-window eviction
//! - Clock abstraction for time-based policies
//! - Client identification from HTTP headers

pub mod client;
pub mod clock;
pub mod rate_limit;
