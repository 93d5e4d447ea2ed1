//! Domain Entities
//!
//! The weather record passed between provider, cache and HTTP layer,
//! plus the classification rules derived from its readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weather entity - current conditions at a place
///
/// Serialized as JSON when written to the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub location: Place,
    pub current: CurrentConditions,
    /// When this record was fetched from the provider
    pub updated_at: DateTime<Utc>,
}

/// Geographic information as resolved by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub region: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub local_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub last_updated: DateTime<Utc>,
    pub temperature: Temperature,
    pub condition: Condition,
    pub wind: Wind,
    pub pressure: Pressure,
    pub precipitation: Precipitation,
    /// Relative humidity, percent
    pub humidity: u8,
    /// Cloud cover, percent
    pub cloud_cover: u8,
    pub visibility: Distance,
    pub uv_index: f64,
    pub is_day: bool,
    pub radiation: Radiation,
}

/// A temperature in both scales
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub celsius: f64,
    pub fahrenheit: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub celsius: f64,
    pub fahrenheit: f64,
    pub feels_like: Reading,
    pub windchill: Reading,
    pub heat_index: Reading,
    pub dewpoint: Reading,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub code: i32,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed_kph: f64,
    pub speed_mph: f64,
    /// Compass direction, e.g. "WSW"
    pub direction: String,
    pub degree: u16,
    pub gust_kph: f64,
    pub gust_mph: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pressure {
    pub millibars: f64,
    pub inches: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Precipitation {
    pub millimeters: f64,
    pub inches: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub kilometers: f64,
    pub miles: f64,
}

/// Solar radiation, W/m²
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Radiation {
    pub short_wave: f64,
    pub diffuse: f64,
    /// Direct normal irradiance
    pub dni: f64,
    /// Global tilted irradiance
    pub gti: f64,
}

// ============================================================================
// Classifications
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComfortLevel {
    ExtremeCold,
    Freezing,
    Cold,
    Cool,
    Comfortable,
    Warm,
    Hot,
    ExtremeHeat,
}

impl fmt::Display for ComfortLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComfortLevel::ExtremeCold => "Extreme Cold",
            ComfortLevel::Freezing => "Freezing",
            ComfortLevel::Cold => "Cold",
            ComfortLevel::Cool => "Cool",
            ComfortLevel::Comfortable => "Comfortable",
            ComfortLevel::Warm => "Warm",
            ComfortLevel::Hot => "Hot",
            ComfortLevel::ExtremeHeat => "Extreme Heat",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainfallIntensity {
    None,
    Light,
    Moderate,
    Heavy,
    Violent,
}

impl fmt::Display for RainfallIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RainfallIntensity::None => "No Rain",
            RainfallIntensity::Light => "Light Rain",
            RainfallIntensity::Moderate => "Moderate Rain",
            RainfallIntensity::Heavy => "Heavy Rain",
            RainfallIntensity::Violent => "Violent Rain",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvRisk {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl fmt::Display for UvRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UvRisk::Low => "Low",
            UvRisk::Moderate => "Moderate",
            UvRisk::High => "High",
            UvRisk::VeryHigh => "Very High",
            UvRisk::Extreme => "Extreme",
        })
    }
}

/// Upper bounds (exclusive, kph) of Beaufort forces 0 through 11
const BEAUFORT_UPPER_KPH: [f64; 12] = [
    1.0, 6.0, 12.0, 20.0, 29.0, 39.0, 50.0, 62.0, 75.0, 89.0, 103.0, 118.0,
];

impl Temperature {
    pub fn is_freezing(&self) -> bool {
        self.celsius <= 0.0
    }

    pub fn is_cold(&self) -> bool {
        self.celsius <= 10.0
    }

    pub fn is_hot(&self) -> bool {
        self.celsius >= 30.0
    }

    pub fn is_extreme(&self) -> bool {
        self.celsius >= 40.0 || self.celsius <= -20.0
    }

    pub fn comfort_level(&self) -> ComfortLevel {
        match self.celsius {
            c if c < -20.0 => ComfortLevel::ExtremeCold,
            c if c < 0.0 => ComfortLevel::Freezing,
            c if c < 10.0 => ComfortLevel::Cold,
            c if c < 20.0 => ComfortLevel::Cool,
            c if c < 25.0 => ComfortLevel::Comfortable,
            c if c < 30.0 => ComfortLevel::Warm,
            c if c < 40.0 => ComfortLevel::Hot,
            _ => ComfortLevel::ExtremeHeat,
        }
    }
}

impl Wind {
    pub fn is_strong(&self) -> bool {
        self.speed_kph >= 50.0
    }

    pub fn is_gale(&self) -> bool {
        self.speed_kph >= 62.0
    }

    /// Beaufort force, 0 (calm) to 12 (hurricane)
    pub fn beaufort_scale(&self) -> u8 {
        BEAUFORT_UPPER_KPH
            .iter()
            .position(|&upper| self.speed_kph < upper)
            .map_or(12, |force| force as u8)
    }
}

impl Precipitation {
    pub fn is_raining(&self) -> bool {
        self.millimeters > 0.0
    }

    pub fn is_heavy(&self) -> bool {
        self.millimeters >= 10.0
    }

    pub fn intensity(&self) -> RainfallIntensity {
        match self.millimeters {
            mm if mm <= 0.0 => RainfallIntensity::None,
            mm if mm < 2.5 => RainfallIntensity::Light,
            mm if mm < 10.0 => RainfallIntensity::Moderate,
            mm if mm < 50.0 => RainfallIntensity::Heavy,
            _ => RainfallIntensity::Violent,
        }
    }
}

impl CurrentConditions {
    pub fn is_high_humidity(&self) -> bool {
        self.humidity >= 70
    }

    pub fn is_low_humidity(&self) -> bool {
        self.humidity <= 30
    }

    pub fn is_cloudy(&self) -> bool {
        self.cloud_cover >= 50
    }

    pub fn is_clear(&self) -> bool {
        self.cloud_cover <= 20
    }

    pub fn uv_risk(&self) -> UvRisk {
        match self.uv_index {
            uv if uv < 3.0 => UvRisk::Low,
            uv if uv < 6.0 => UvRisk::Moderate,
            uv if uv < 8.0 => UvRisk::High,
            uv if uv < 11.0 => UvRisk::VeryHigh,
            _ => UvRisk::Extreme,
        }
    }

    pub fn is_poor_visibility(&self) -> bool {
        self.visibility.kilometers <= 2.0
    }

    pub fn is_good_visibility(&self) -> bool {
        self.visibility.kilometers >= 10.0
    }
}

impl Weather {
    /// One-line summary, e.g. "Light rain, Cool, Light Rain, Strong Winds"
    pub fn description(&self) -> String {
        let current = &self.current;
        let mut parts = vec![
            current.condition.text.clone(),
            current.temperature.comfort_level().to_string(),
        ];

        if current.precipitation.is_raining() {
            parts.push(current.precipitation.intensity().to_string());
        }
        if current.wind.is_strong() {
            parts.push("Strong Winds".to_string());
        }

        parts.join(", ")
    }

    pub fn is_extreme(&self) -> bool {
        let current = &self.current;
        current.temperature.is_extreme()
            || current.wind.is_gale()
            || current.precipitation.is_heavy()
            || current.is_poor_visibility()
    }
}
