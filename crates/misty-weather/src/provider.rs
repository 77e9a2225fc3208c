//! Weather lookup through the Misty weather proxy (`GET /api/weather?city=`).
//! The proxy forwards the upstream's metric payload verbatim.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::types::{LookupError, LookupResult, WeatherReading};

const WEATHER_PATH: &str = "/api/weather";

#[derive(Debug, Deserialize)]
struct ProxyWeatherResponse {
    name: Option<String>,
    main: MainBlock,
    weather: Option<Vec<Option<ConditionBlock>>>,
    visibility: Option<f64>,
    wind: Option<WindBlock>,
}

// Integral fields are read as f64: some upstreams send `66.0` for humidity
#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    feels_like: f64,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: Option<f64>,
}

impl ProxyWeatherResponse {
    /// Missing optional fields never fail the lookup; `main.temp` and
    /// `main.feels_like` are enforced by deserialization.
    fn into_reading(self, requested_city: &str) -> WeatherReading {
        let description = self
            .weather
            .and_then(|conditions| conditions.into_iter().next().flatten())
            .and_then(|c| c.description)
            .unwrap_or_default();

        let city_name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| requested_city.to_string());

        // `as` saturates and maps NaN to 0
        WeatherReading {
            city_name,
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            min_temp_c: self.main.temp_min.unwrap_or(self.main.temp),
            max_temp_c: self.main.temp_max.unwrap_or(self.main.temp),
            humidity_pct: self.main.humidity.map(|h| h.round() as u8).unwrap_or_default(),
            pressure_hpa: self.main.pressure.map(|p| p.round() as u32).unwrap_or_default(),
            visibility_m: self.visibility.map(|v| v.round() as u32).unwrap_or_default(),
            wind_speed_ms: self.wind.and_then(|w| w.speed).unwrap_or_default(),
            description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current weather for `city`.
    ///
    /// Transport errors, non-2xx statuses and unusable bodies all become
    /// `WeatherUnavailable`; the caller decides what the user sees.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_weather(&self, city: &str) -> LookupResult<WeatherReading> {
        let url = format!("{}{}", self.base_url, WEATHER_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[("city", city)])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Weather proxy request failed: {}", e);
                LookupError::WeatherUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("Weather proxy returned {}: {}", status, text);
            return Err(LookupError::WeatherUnavailable(format!(
                "proxy returned status {}",
                status
            )));
        }

        let body: ProxyWeatherResponse = response.json().await.map_err(|e| {
            tracing::warn!("Weather proxy parse error: {}", e);
            LookupError::WeatherUnavailable(format!("invalid weather response: {}", e))
        })?;

        let reading = body.into_reading(city);
        tracing::info!(
            "Weather for {}: {:.1}°C, feels like {:.1}°C",
            reading.city_name,
            reading.temperature_c,
            reading.feels_like_c
        );
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> WeatherProvider {
        WeatherProvider::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn pasig_payload() -> serde_json::Value {
        serde_json::json!({
            "name": "Pasig",
            "main": {
                "temp": 31.2,
                "feels_like": 35.0,
                "temp_min": 30.1,
                "temp_max": 32.4,
                "humidity": 66,
                "pressure": 1009
            },
            "weather": [ { "id": 802, "main": "Clouds", "description": "scattered clouds" } ],
            "visibility": 10000,
            "wind": { "speed": 4.12, "deg": 90 }
        })
    }

    #[tokio::test]
    async fn test_fetch_weather_normalizes_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .and(query_param("city", "Pasig"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pasig_payload()))
            .mount(&server)
            .await;

        let reading = provider(&server).fetch_weather("Pasig").await.unwrap();

        assert_eq!(reading.city_name, "Pasig");
        assert_eq!(reading.temperature_c, 31.2);
        assert_eq!(reading.feels_like_c, 35.0);
        assert_eq!(reading.min_temp_c, 30.1);
        assert_eq!(reading.max_temp_c, 32.4);
        assert_eq!(reading.humidity_pct, 66);
        assert_eq!(reading.pressure_hpa, 1009);
        assert_eq!(reading.visibility_m, 10000);
        assert_eq!(reading.wind_speed_ms, 4.12);
        assert_eq!(reading.description, "scattered clouds");
    }

    #[tokio::test]
    async fn test_missing_weather_array_gives_empty_description() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Pasig",
                "main": { "temp": 31.0, "feels_like": 35.0 }
            })))
            .mount(&server)
            .await;

        let reading = provider(&server).fetch_weather("Pasig").await.unwrap();
        assert_eq!(reading.description, "");
        assert_eq!(reading.min_temp_c, 31.0);
        assert_eq!(reading.visibility_m, 0);
    }

    #[tokio::test]
    async fn test_empty_weather_array_gives_empty_description() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "main": { "temp": 29.0, "feels_like": 30.5 },
                "weather": []
            })))
            .mount(&server)
            .await;

        let reading = provider(&server).fetch_weather("Taguig").await.unwrap();
        assert_eq!(reading.description, "");
        // No `name` in the payload: keep the city we asked for
        assert_eq!(reading.city_name, "Taguig");
    }

    async fn fetch_payload(payload: serde_json::Value) -> LookupResult<WeatherReading> {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload))
            .mount(&server)
            .await;

        provider(&server).fetch_weather("Pasig").await
    }

    #[tokio::test]
    async fn test_null_description_gives_empty_description() {
        let reading = fetch_payload(serde_json::json!({
            "name": "Pasig",
            "main": { "temp": 31.0, "feels_like": 35.0 },
            "weather": [ { "description": null } ]
        }))
        .await
        .unwrap();
        assert_eq!(reading.description, "");
        assert_eq!(reading.feels_like_c, 35.0);
    }

    #[tokio::test]
    async fn test_null_first_condition_gives_empty_description() {
        let reading = fetch_payload(serde_json::json!({
            "name": "Pasig",
            "main": { "temp": 31.0, "feels_like": 35.0 },
            "weather": [ null ]
        }))
        .await
        .unwrap();
        assert_eq!(reading.description, "");
    }

    #[tokio::test]
    async fn test_float_integral_fields_are_accepted() {
        let reading = fetch_payload(serde_json::json!({
            "name": "Pasig",
            "main": {
                "temp": 31.0,
                "feels_like": 35.0,
                "humidity": 66.0,
                "pressure": 1009.4
            },
            "weather": [ { "description": "haze" } ],
            "visibility": 9999.6
        }))
        .await
        .unwrap();
        assert_eq!(reading.humidity_pct, 66);
        assert_eq!(reading.pressure_hpa, 1009);
        assert_eq!(reading.visibility_m, 10000);
        assert_eq!(reading.description, "haze");
    }

    #[tokio::test]
    async fn test_out_of_range_humidity_saturates() {
        let reading = fetch_payload(serde_json::json!({
            "main": { "temp": 31.0, "feels_like": 35.0, "humidity": 300.0, "pressure": -5.0 }
        }))
        .await
        .unwrap();
        assert_eq!(reading.humidity_pct, 255);
        assert_eq!(reading.pressure_hpa, 0);
    }

    #[tokio::test]
    async fn test_proxy_error_is_weather_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "Unable to fetch weather data"
            })))
            .mount(&server)
            .await;

        let result = provider(&server).fetch_weather("Atlantis").await;
        assert!(matches!(result, Err(LookupError::WeatherUnavailable(_))));
    }

    #[tokio::test]
    async fn test_missing_feels_like_is_weather_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Pasig",
                "main": { "temp": 31.0 }
            })))
            .mount(&server)
            .await;

        let result = provider(&server).fetch_weather("Pasig").await;
        assert!(matches!(result, Err(LookupError::WeatherUnavailable(_))));
    }

    #[tokio::test]
    async fn test_unreachable_proxy_is_weather_unavailable() {
        // Nothing listens on port 9 on loopback in test environments
        let provider =
            WeatherProvider::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = provider.fetch_weather("Pasig").await;
        assert!(matches!(result, Err(LookupError::WeatherUnavailable(_))));
    }
}
