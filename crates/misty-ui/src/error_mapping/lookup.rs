use misty_core::{AppError, WeatherError};
use misty_weather::LookupError;

/// Convert a pipeline failure into the application error hierarchy
pub fn app_error(e: LookupError) -> AppError {
    match e {
        LookupError::GeocodeUnavailable(s) => {
            AppError::Weather(WeatherError::GeocodeUnavailable(s))
        }
        LookupError::CityNotFound => AppError::Weather(WeatherError::CityNotFound),
        LookupError::WeatherUnavailable(s) => {
            AppError::Weather(WeatherError::WeatherUnavailable(s))
        }
    }
}

/// User-facing text for a pipeline failure
pub fn user_message(e: &LookupError) -> &'static str {
    app_error(e.clone()).user_message()
}
