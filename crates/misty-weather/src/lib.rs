//! Weather lookup for Misty
//!
//! Resolves a tapped coordinate to a city name, fetches the city's weather
//! through the weather proxy, and classifies the heat index.

pub mod geocode;
pub mod hazard;
pub mod provider;
pub mod types;

pub use geocode::Geocoder;
pub use hazard::{classify, HazardInfo, HazardTier};
pub use provider::WeatherProvider;
pub use types::*;
