//! Domain Value Objects
//!
//! Immutable value types for the weather domain.

use std::fmt;
use thiserror::Error;

/// Error returned when a location fails validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// Location is empty or whitespace only
    #[error("location cannot be empty")]
    Empty,
}

/// Place name a weather lookup is made for
///
/// Always trimmed and never empty; the only way to build one is
/// [`Location::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    pub fn parse(raw: &str) -> Result<Self, LocationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LocationError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
