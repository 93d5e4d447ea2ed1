//! WeatherAPI.com Provider
//!
//! `client` speaks HTTP; `model` holds the API's wire shape and its mapping
//! onto the domain entity.

pub mod client;
pub mod model;

pub use client::WeatherApiClient;
