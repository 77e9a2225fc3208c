//! Lookup backend: async reverse geocoding and weather fetches.
//! All network work runs off the caller's thread; results sent via mpsc,
//! tagged with the attempt that requested them.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use misty_core::ServiceConfig;
use misty_weather::{Coordinate, Geocoder, LookupResult, WeatherProvider, WeatherReading};
use tokio::runtime::Handle;

/// Clients for the two collaborators of a lookup
#[derive(Debug, Clone)]
pub struct LookupServices {
    pub geocoder: Arc<Geocoder>,
    pub provider: Arc<WeatherProvider>,
}

impl LookupServices {
    pub fn new(geocoder: Geocoder, provider: WeatherProvider) -> Self {
        Self {
            geocoder: Arc::new(geocoder),
            provider: Arc::new(provider),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let geocoder = Geocoder::new(
            &config.geocoding_url,
            config.geocoding_api_key.clone(),
            timeout,
        )
        .context("Failed to create geocoding client")?;

        let provider = WeatherProvider::new(&config.weather_proxy_url, timeout)
            .context("Failed to create weather proxy client")?;

        Ok(Self::new(geocoder, provider))
    }
}

/// Messages sent from async operations back to the model
#[derive(Debug)]
pub enum LookupServiceMessage {
    /// Result of reverse geocoding the tapped coordinate
    CityResolved {
        attempt: u64,
        result: LookupResult<String>,
    },
    /// Result of fetching weather for the resolved city
    WeatherFetched {
        attempt: u64,
        result: LookupResult<WeatherReading>,
    },
}

impl LookupServiceMessage {
    /// Attempt number the result belongs to
    pub fn attempt(&self) -> u64 {
        match self {
            LookupServiceMessage::CityResolved { attempt, .. }
            | LookupServiceMessage::WeatherFetched { attempt, .. } => *attempt,
        }
    }
}

/// Request reverse geocoding of `coordinate`.
/// Sends `CityResolved` on the channel when complete.
pub fn request_resolve(
    tx: &Sender<LookupServiceMessage>,
    runtime: &Handle,
    services: &LookupServices,
    attempt: u64,
    coordinate: Coordinate,
) {
    let tx = tx.clone();
    let geocoder = services.geocoder.clone();

    runtime.spawn(async move {
        let result = geocoder.resolve_city(coordinate).await;
        // Receiver gone means the model was dropped
        let _ = tx.send(LookupServiceMessage::CityResolved { attempt, result });
    });
}

/// Request current weather for `city`.
/// Sends `WeatherFetched` on the channel when complete.
pub fn request_weather(
    tx: &Sender<LookupServiceMessage>,
    runtime: &Handle,
    services: &LookupServices,
    attempt: u64,
    city: String,
) {
    let tx = tx.clone();
    let provider = services.provider.clone();

    runtime.spawn(async move {
        let result = provider.fetch_weather(&city).await;
        let _ = tx.send(LookupServiceMessage::WeatherFetched { attempt, result });
    });
}
