//! Infrastructure Layer
//!
//! Adapters for the domain ports.

pub mod redis;
pub mod weatherapi;
