pub mod app;
pub mod config;
pub mod error;
pub mod lookup_state;

pub use app::App;
pub use config::{Config, ProxyConfig, ServiceConfig, ValidationResult, WarningConfig};
pub use error::{AppError, ConfigError, NetworkError, WeatherError};
pub use lookup_state::LookupPhase;

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Misty core initialized");
    Ok(())
}
