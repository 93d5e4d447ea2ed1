//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of vocabulary shared across
//! crates:
//! - Error classification ([`error::kind::ErrorKind`])
//! - The unified error envelope and result alias ([`error::app_error::AppError`])
//! - Its HTTP response mapping (behind the `axum` feature)
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
