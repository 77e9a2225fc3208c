//! Weather proxy: keeps the upstream API key on the server and exposes a
//! single keyless endpoint, `GET /api/weather?city=<name>`.
//!
//! Successful upstream payloads are forwarded untouched. Anything else
//! becomes a short JSON error.

pub mod error;

use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use misty_core::error::ReqwestErrorExt;
use misty_core::{NetworkError, ProxyConfig};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};

pub use error::ProxyError;

const UPSTREAM_PATH: &str = "/data/2.5/weather";
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared handler state
#[derive(Debug, Clone)]
pub struct ProxyState {
    client: Client,
    upstream_url: String,
    api_key: String,
}

impl ProxyState {
    pub fn new(upstream_url: &str, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .context("Failed to create upstream HTTP client")?;

        let api_key = api_key.unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("WEATHER_API_KEY not set - upstream will reject every request");
        }

        Ok(Self {
            client,
            upstream_url: upstream_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &ProxyConfig) -> Result<Self> {
        Self::new(&config.upstream_url, config.weather_api_key.clone())
    }

    /// Current conditions for `city`, in metric units, as the upstream sent them
    async fn fetch_upstream(&self, city: &str) -> Result<Value, NetworkError> {
        let url = format!("{}{}", self.upstream_url, UPSTREAM_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    city: Option<String>,
}

/// Build the proxy router with permissive CORS
pub fn router(state: ProxyState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/weather", get(get_weather))
        .layer(cors)
        .with_state(state)
}

async fn get_weather(
    State(state): State<ProxyState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<Value>, ProxyError> {
    // A query string that doesn't parse (e.g. `city` given twice) has no usable city
    let Query(query) = query.map_err(|e| {
        tracing::debug!("Rejected weather query: {}", e);
        ProxyError::MissingCity
    })?;

    let city = query
        .city
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or(ProxyError::MissingCity)?;

    match state.fetch_upstream(&city).await {
        Ok(body) => {
            tracing::info!("Weather for {} forwarded", city);
            Ok(Json(body))
        }
        Err(e) => {
            tracing::error!("Weather upstream failed for {}: {}", city, e);
            Err(ProxyError::Upstream(e))
        }
    }
}

/// Bind `0.0.0.0:<port>` and serve until the process is stopped
pub async fn run(port: u16, state: ProxyState) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Weather proxy listening on http://localhost:{}", port);
    axum::serve(listener, router(state))
        .await
        .context("Weather proxy server stopped")?;
    Ok(())
}
