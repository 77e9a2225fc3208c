//! End-to-end lookup flow against mocked geocoder and weather proxy.

use std::sync::Arc;
use std::time::Duration;

use misty_core::LookupPhase;
use misty_ui::{LookupModel, LookupServices};
use misty_weather::{Coordinate, Geocoder, HazardTier, WeatherProvider};
use tokio::runtime::Handle;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SETTLE: Duration = Duration::from_secs(5);

fn model(geocoder: &MockServer, proxy: &MockServer) -> LookupModel {
    let geocoder = Geocoder::new(
        &geocoder.uri(),
        Some("test-key".to_string()),
        Duration::from_secs(5),
    )
    .unwrap();
    let provider = WeatherProvider::new(&proxy.uri(), Duration::from_secs(5)).unwrap();
    LookupModel::new(
        Arc::new(LookupServices::new(geocoder, provider)),
        Handle::current(),
        true,
    )
}

fn city_body(city: &str) -> serde_json::Value {
    serde_json::json!({ "results": [ { "components": { "city": city, "country": "Philippines" } } ] })
}

fn weather_body(city: &str, feels_like: f64) -> serde_json::Value {
    serde_json::json!({
        "name": city,
        "main": {
            "temp": feels_like - 4.0,
            "feels_like": feels_like,
            "temp_min": feels_like - 5.0,
            "temp_max": feels_like - 3.0,
            "humidity": 70,
            "pressure": 1008
        },
        "weather": [ { "description": "few clouds" } ],
        "visibility": 10000,
        "wind": { "speed": 3.6 }
    })
}

async fn mount_city(server: &MockServer, query: &str, city: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/geocode/v1/json"))
        .and(query_param("q", query))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(city_body(city))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn tap_in_pasig_shows_extreme_caution() {
    let geocoder = MockServer::start().await;
    let proxy = MockServer::start().await;

    mount_city(&geocoder, "14.6258,121.0617", "Pasig", Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .and(query_param("city", "Pasig"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Pasig", 35.0)))
        .expect(1)
        .mount(&proxy)
        .await;

    let mut model = model(&geocoder, &proxy);
    model.tap(Coordinate::new(14.6258, 121.0617));
    assert!(model.settle(SETTLE).await);

    assert_eq!(model.phase(), LookupPhase::Classified);
    assert_eq!(model.resolved_city(), Some("Pasig"));
    let reading = model.reading().unwrap();
    assert_eq!(reading.feels_like_c, 35.0);
    assert_eq!(reading.description, "few clouds");
    assert_eq!(model.warning().tier, Some(HazardTier::ExtremeCaution));
    assert!(model.should_show_warning());
    assert!(model.error_message().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn open_ocean_never_calls_proxy() {
    let geocoder = MockServer::start().await;
    let proxy = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/v1/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [ { "components": { "body_of_water": "Pacific Ocean" } } ]
        })))
        .mount(&geocoder)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&proxy)
        .await;

    let mut model = model(&geocoder, &proxy);
    model.tap(Coordinate::new(0.0, -160.0));
    assert!(model.settle(SETTLE).await);

    assert_eq!(model.phase(), LookupPhase::Error);
    assert_eq!(
        model.error_message(),
        Some("Could not determine city name at this location.")
    );
    assert!(model.reading().is_none());
    assert!(!model.should_show_warning());
}

#[tokio::test(flavor = "multi_thread")]
async fn last_tap_wins_over_slow_first_tap() {
    let geocoder = MockServer::start().await;
    let proxy = MockServer::start().await;

    // Tap A resolves slowly, tap B quickly
    mount_city(&geocoder, "14.5995,120.9842", "Manila", Duration::from_millis(500)).await;
    mount_city(&geocoder, "14.6258,121.0617", "Pasig", Duration::ZERO).await;

    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .and(query_param("city", "Pasig"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Pasig", 35.0)))
        .expect(1)
        .mount(&proxy)
        .await;
    // A stale city must never reach the proxy
    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .and(query_param("city", "Manila"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Manila", 45.0)))
        .expect(0)
        .mount(&proxy)
        .await;

    let mut model = model(&geocoder, &proxy);
    let a = model.tap(Coordinate::new(14.5995, 120.9842));
    let b = model.tap(Coordinate::new(14.6258, 121.0617));
    assert!(b > a);

    assert!(model.settle(SETTLE).await);
    assert_eq!(model.reading().map(|r| r.city_name.as_str()), Some("Pasig"));

    // Let A's late answer arrive and get dropped
    tokio::time::sleep(Duration::from_millis(700)).await;
    model.poll_channel();

    assert_eq!(model.phase(), LookupPhase::Classified);
    assert_eq!(model.resolved_city(), Some("Pasig"));
    assert_eq!(model.warning().tier, Some(HazardTier::ExtremeCaution));
    assert_eq!(model.marker(), Some(Coordinate::new(14.6258, 121.0617)));
}

#[tokio::test(flavor = "multi_thread")]
async fn proxy_failure_shows_weather_error() {
    let geocoder = MockServer::start().await;
    let proxy = MockServer::start().await;

    mount_city(&geocoder, "14.6258,121.0617", "Pasig", Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": "Unable to fetch weather data"
        })))
        .mount(&proxy)
        .await;

    let mut model = model(&geocoder, &proxy);
    model.tap(Coordinate::new(14.6258, 121.0617));
    assert!(model.settle(SETTLE).await);

    assert_eq!(model.phase(), LookupPhase::Error);
    assert_eq!(
        model.error_message(),
        Some("Could not fetch weather data. Please try again.")
    );
    assert!(model.reading().is_none());
    assert!(!model.warning().visible);
}

#[tokio::test(flavor = "multi_thread")]
async fn toggling_warning_does_not_refetch() {
    let geocoder = MockServer::start().await;
    let proxy = MockServer::start().await;

    mount_city(&geocoder, "14.6258,121.0617", "Pasig", Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Pasig", 45.0)))
        .expect(1)
        .mount(&proxy)
        .await;

    let mut model = model(&geocoder, &proxy);
    model.tap(Coordinate::new(14.6258, 121.0617));
    assert!(model.settle(SETTLE).await);
    assert_eq!(model.warning().tier, Some(HazardTier::Danger));

    model.set_warning_enabled(false);
    assert!(!model.should_show_warning());
    assert!(!model.poll_channel());
    assert_eq!(model.phase(), LookupPhase::Classified);
}
