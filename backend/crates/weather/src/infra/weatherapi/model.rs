//! WeatherAPI.com response model
//!
//! Mirrors the `current.json` payload. Optional readings default to zero so a
//! sparse but well-formed response still decodes.

use crate::domain::entities::{
    Condition, CurrentConditions, Distance, Place, Precipitation, Pressure, Radiation, Reading,
    Temperature, Weather, Wind,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiWeatherResponse {
    pub location: ApiLocation,
    pub current: ApiCurrent,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiLocation {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub tz_id: String,
    pub localtime_epoch: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiCurrent {
    pub last_updated_epoch: i64,
    pub temp_c: f64,
    pub temp_f: f64,
    pub is_day: u8,
    pub condition: ApiCondition,
    pub wind_mph: f64,
    pub wind_kph: f64,
    pub wind_degree: u16,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub pressure_in: f64,
    pub precip_mm: f64,
    pub precip_in: f64,
    pub humidity: u8,
    pub cloud: u8,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub windchill_c: f64,
    pub windchill_f: f64,
    pub heatindex_c: f64,
    pub heatindex_f: f64,
    pub dewpoint_c: f64,
    pub dewpoint_f: f64,
    pub vis_km: f64,
    pub vis_miles: f64,
    pub uv: f64,
    pub gust_mph: f64,
    pub gust_kph: f64,
    pub short_rad: f64,
    pub diff_rad: f64,
    pub dni: f64,
    pub gti: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiCondition {
    pub text: String,
    pub icon: String,
    pub code: i32,
}

fn from_epoch(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

impl From<ApiWeatherResponse> for Weather {
    fn from(api: ApiWeatherResponse) -> Self {
        let ApiWeatherResponse { location, current } = api;

        Weather {
            location: Place {
                name: location.name,
                region: location.region,
                country: location.country,
                latitude: location.lat,
                longitude: location.lon,
                timezone: location.tz_id,
                local_time: from_epoch(location.localtime_epoch),
            },
            current: CurrentConditions {
                last_updated: from_epoch(current.last_updated_epoch),
                temperature: Temperature {
                    celsius: current.temp_c,
                    fahrenheit: current.temp_f,
                    feels_like: Reading {
                        celsius: current.feelslike_c,
                        fahrenheit: current.feelslike_f,
                    },
                    windchill: Reading {
                        celsius: current.windchill_c,
                        fahrenheit: current.windchill_f,
                    },
                    heat_index: Reading {
                        celsius: current.heatindex_c,
                        fahrenheit: current.heatindex_f,
                    },
                    dewpoint: Reading {
                        celsius: current.dewpoint_c,
                        fahrenheit: current.dewpoint_f,
                    },
                },
                condition: Condition {
                    text: current.condition.text,
                    code: current.condition.code,
                    icon: current.condition.icon,
                },
                wind: Wind {
                    speed_kph: current.wind_kph,
                    speed_mph: current.wind_mph,
                    direction: current.wind_dir,
                    degree: current.wind_degree,
                    gust_kph: current.gust_kph,
                    gust_mph: current.gust_mph,
                },
                pressure: Pressure {
                    millibars: current.pressure_mb,
                    inches: current.pressure_in,
                },
                precipitation: Precipitation {
                    millimeters: current.precip_mm,
                    inches: current.precip_in,
                },
                humidity: current.humidity,
                cloud_cover: current.cloud,
                visibility: Distance {
                    kilometers: current.vis_km,
                    miles: current.vis_miles,
                },
                uv_index: current.uv,
                is_day: current.is_day == 1,
                radiation: Radiation {
                    short_wave: current.short_rad,
                    diffuse: current.diff_rad,
                    dni: current.dni,
                    gti: current.gti,
                },
            },
            updated_at: Utc::now(),
        }
    }
}
