use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Geocoder and weather proxy endpoints used by the lookup pipeline
    pub services: ServiceConfig,

    /// Heat index warning preferences
    #[serde(default)]
    pub warning: WarningConfig,

    /// Settings for the weather proxy server
    #[serde(default)]
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the weather proxy (serves `/api/weather`)
    pub weather_proxy_url: String,

    /// Base URL of the OpenCage-compatible reverse geocoder
    pub geocoding_url: String,

    /// Geocoder API key (optional, can be set via environment)
    pub geocoding_api_key: Option<String>,

    /// Per-request timeout for both collaborators
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningConfig {
    /// Whether the heat index warning starts enabled for a session
    pub enabled: bool,
}

impl Default for WarningConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Port the proxy listens on (`PORT` overrides)
    #[serde(default = "default_proxy_port")]
    pub port: u16,

    /// Base URL of the OpenWeatherMap-compatible upstream
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Upstream API key (`WEATHER_API_KEY` overrides)
    #[serde(default)]
    pub weather_api_key: Option<String>,
}

fn default_proxy_port() -> u16 {
    5000
}

fn default_upstream_url() -> String {
    "https://api.openweathermap.org".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: default_proxy_port(),
            upstream_url: default_upstream_url(),
            weather_api_key: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("misty");

        Self {
            config_dir,
            services: ServiceConfig {
                weather_proxy_url: "http://localhost:5000".to_string(),
                geocoding_url: "https://api.opencagedata.com".to_string(),
                geocoding_api_key: None,
                request_timeout_secs: default_request_timeout_secs(),
            },
            warning: WarningConfig::default(),
            proxy: ProxyConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist.
    /// Environment overrides are applied after loading and never written back.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit path, writing defaults if it is missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Apply `OPENCAGE_API_KEY`, `WEATHER_API_KEY` and `PORT` from the environment
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENCAGE_API_KEY") {
            tracing::info!("Using geocoding key from OPENCAGE_API_KEY environment variable");
            self.services.geocoding_api_key = Some(key);
        }

        if let Ok(key) = std::env::var("WEATHER_API_KEY") {
            self.proxy.weather_api_key = Some(key);
        }

        if let Ok(port) = std::env::var("PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.proxy.port = p,
                Err(e) => tracing::warn!("Ignoring invalid PORT '{}': {}", port, e),
            }
        }
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.services.weather_proxy_url,
            "services.weather_proxy_url",
            &mut result,
        );
        self.validate_url(
            &self.services.geocoding_url,
            "services.geocoding_url",
            &mut result,
        );
        self.validate_url(&self.proxy.upstream_url, "proxy.upstream_url", &mut result);

        if self.services.request_timeout_secs == 0 {
            result.add_error(
                "services.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.services.request_timeout_secs > 120 {
            result.add_warning(
                "services.request_timeout_secs",
                "Request timeout is unusually long (>120s)",
            );
        }

        if self.proxy.port == 0 {
            result.add_error("proxy.port", "Port cannot be 0");
        }

        // Missing keys only disable the stage that needs them
        if !has_value(&self.services.geocoding_api_key) {
            result.add_warning(
                "services.geocoding_api_key",
                "Geocoding API key not configured - map taps will fail to resolve a city",
            );
        }

        if !has_value(&self.proxy.weather_api_key) {
            result.add_warning(
                "proxy.weather_api_key",
                "Weather API key not configured - the proxy cannot reach its upstream",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                // Check scheme
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                // Check host
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("misty");

        Ok(config_dir.join("config.toml"))
    }
}

fn has_value(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}
