use serde::{Deserialize, Serialize};

/// A tapped point on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Current conditions for a city, normalized from the proxy payload.
/// All temperatures are metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub city_name: String,
    pub temperature_c: f64,
    /// Heat index; drives hazard classification
    pub feels_like_c: f64,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub visibility_m: u32,
    pub wind_speed_ms: f64,
    /// Empty when the provider sent no condition entry
    pub description: String,
}

impl WeatherReading {
    pub fn visibility_km(&self) -> f64 {
        f64::from(self.visibility_m) / 1000.0
    }
}

/// Why a lookup attempt stopped.
///
/// The payload is diagnostic detail for logs; it is never shown to users.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Reverse geocoding failed: {0}")]
    GeocodeUnavailable(String),
    #[error("No city, town or village found at this location")]
    CityNotFound,
    #[error("Weather fetch failed: {0}")]
    WeatherUnavailable(String),
}

/// Outcome of one lookup stage
pub type LookupResult<T> = Result<T, LookupError>;
