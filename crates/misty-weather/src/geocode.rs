//! Reverse geocoding: convert a tapped coordinate to a city name.
//! Uses an OpenCage-compatible API (key required).

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::types::{Coordinate, LookupError, LookupResult};

const GEOCODE_PATH: &str = "/geocode/v1/json";
const USER_AGENT: &str = "Misty/0.1.0";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    components: GeocodeComponents,
}

#[derive(Debug, Default, Deserialize)]
struct GeocodeComponents {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

/// Reverse geocoder client
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl Geocoder {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Resolve the city at `coordinate`.
    ///
    /// Looks only at the first result and prefers city > town > village.
    /// Returns `CityNotFound` when the geocoder answered but named no such place,
    /// and `GeocodeUnavailable` for transport, auth and provider errors.
    #[instrument(skip(self), level = "info")]
    pub async fn resolve_city(&self, coordinate: Coordinate) -> LookupResult<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            tracing::warn!("Geocoding API key not configured");
            LookupError::GeocodeUnavailable("geocoding API key not configured".to_string())
        })?;

        let url = format!("{}{}", self.base_url, GEOCODE_PATH);
        let query = format!("{},{}", coordinate.latitude, coordinate.longitude);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query.as_str()), ("key", api_key)])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Reverse geocode request failed: {}", e);
                LookupError::GeocodeUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Reverse geocode returned status {}", status);
            return Err(LookupError::GeocodeUnavailable(format!(
                "geocoder returned status {}",
                status
            )));
        }

        let body: GeocodeResponse = response.json().await.map_err(|e| {
            tracing::warn!("Reverse geocode parse error: {}", e);
            LookupError::GeocodeUnavailable(format!("invalid geocoder response: {}", e))
        })?;

        match place_name(body) {
            Some(city) => {
                tracing::info!("Reverse geocoded to: {}", city);
                Ok(city)
            }
            None => {
                tracing::debug!("No city, town or village in geocoder response");
                Err(LookupError::CityNotFound)
            }
        }
    }
}

/// First non-empty of city, town, village in the first result
fn place_name(body: GeocodeResponse) -> Option<String> {
    let first = body.results.into_iter().next()?;
    let GeocodeComponents {
        city,
        town,
        village,
    } = first.components;

    [city, town, village]
        .into_iter()
        .flatten()
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
}
