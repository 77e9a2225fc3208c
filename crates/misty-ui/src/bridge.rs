use std::sync::{Arc, OnceLock};

use misty_core::Config;

use crate::services::LookupServices;

// Static tokio runtime that lives for the duration of the application
static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

// Lookup clients shared by every LookupModel
static LOOKUP_SERVICES: OnceLock<Arc<LookupServices>> = OnceLock::new();

/// Initialize the tokio runtime (call once at application startup)
fn get_or_init_runtime() -> Option<tokio::runtime::Handle> {
    if let Some(runtime) = RUNTIME.get() {
        return Some(runtime.handle().clone());
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("misty-tokio")
        .build()
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            return None;
        }
    };

    // Another thread may have won the race; its runtime is the one kept
    let _ = RUNTIME.set(runtime);
    RUNTIME.get().map(|r| r.handle().clone())
}

/// Initialize the geocoder and weather proxy clients.
/// Must be called before any LookupModel is created.
pub fn initialize_lookup_services(config: &Config) -> bool {
    // Initialize tracing if not already done
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    if get_or_init_runtime().is_none() {
        return false;
    }

    if config.services.geocoding_api_key.is_none() {
        tracing::warn!(
            "No geocoding API key configured - every lookup will fail with a location error"
        );
    }

    let services = match LookupServices::from_config(&config.services) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to create lookup services: {:#}", e);
            return false;
        }
    };

    if LOOKUP_SERVICES.set(services).is_err() {
        tracing::warn!("Lookup services already initialized");
    }

    tracing::info!(
        "Lookup services initialized (proxy: {})",
        config.services.weather_proxy_url
    );
    true
}

/// Get the initialized lookup services and runtime for use by LookupModels
pub fn get_lookup_services_and_runtime() -> Option<(Arc<LookupServices>, tokio::runtime::Handle)>
{
    let services = LOOKUP_SERVICES.get()?.clone();
    let runtime = RUNTIME.get()?.handle().clone();
    Some((services, runtime))
}

/// Get the runtime handle (always available after any initialization)
pub fn get_runtime() -> Option<tokio::runtime::Handle> {
    RUNTIME.get().map(|r| r.handle().clone())
}
