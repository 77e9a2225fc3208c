use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use misty_core::NetworkError;
use thiserror::Error;

/// Failures the proxy reports to its clients
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("city parameter missing or empty")]
    MissingCity,

    #[error("upstream weather request failed: {0}")]
    Upstream(#[from] NetworkError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingCity => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body text sent to the client; upstream detail stays in the logs
    pub fn public_message(&self) -> &'static str {
        match self {
            ProxyError::MissingCity => "City is required",
            ProxyError::Upstream(_) => "Unable to fetch weather data",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}
