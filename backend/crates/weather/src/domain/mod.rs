//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Weather and its measurement types)
//! - Domain value objects (Location)
//! - Port traits (cache and provider interfaces)

pub mod entities;
pub mod ports;
pub mod value_objects;
