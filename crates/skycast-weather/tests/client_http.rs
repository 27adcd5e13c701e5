//! HTTP-level tests for the weather client and the IP location source,
//! against a stub server.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skycast_core::{FetchError, LocationError, UnitSystem, WeatherConfig};
use skycast_weather::{Coordinate, IpLocationSource, LocationSource, WeatherClient};

fn test_config(server: &MockServer) -> WeatherConfig {
    WeatherConfig {
        api_key: "test-key".to_string(),
        weather_base_url: format!("{}/data/2.5", server.uri()),
        geocode_base_url: format!("{}/geo/1.0", server.uri()),
        units: UnitSystem::Metric,
        request_timeout_secs: 5,
        stale_after_secs: 300,
    }
}

fn test_client(server: &MockServer) -> WeatherClient {
    WeatherClient::new(test_config(server)).unwrap()
}

fn current_body() -> serde_json::Value {
    json!({
        "main": { "temp": 21.4, "feels_like": 20.9, "humidity": 58, "pressure": 1013 },
        "wind": { "speed": 3.6 },
        "weather": [{ "description": "scattered clouds", "icon": "03d" }],
        "dt": 1_700_000_000
    })
}

fn forecast_body() -> serde_json::Value {
    json!({
        "list": [
            {
                "dt": 1_700_000_000,
                "main": { "temp": 20.0, "temp_min": 18.0, "temp_max": 22.0 },
                "weather": [{ "description": "light rain", "icon": "10d" }],
                "pop": 0.35
            },
            {
                "dt": 1_700_010_800,
                "main": { "temp": 19.0, "temp_min": 17.0, "temp_max": 21.0 },
                "weather": [{ "description": "overcast clouds", "icon": "04d" }],
                "pop": 0.1
            }
        ]
    })
}

#[tokio::test]
async fn fetch_current_parses_conditions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "12.97"))
        .and(query_param("lon", "77.59"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let current = client
        .fetch_current(&Coordinate::new(12.97, 77.59))
        .await
        .unwrap();

    assert_eq!(current.temperature, 21.4);
    assert_eq!(current.humidity, 58);
    assert_eq!(current.condition, "scattered clouds");
    assert_eq!(current.icon, "03d");
}

#[tokio::test]
async fn fetch_forecast_preserves_upstream_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let forecast = client
        .fetch_forecast(&Coordinate::new(12.97, 77.59))
        .await
        .unwrap();

    assert_eq!(forecast.len(), 2);
    assert!(forecast.samples[0].time < forecast.samples[1].time);
    assert_eq!(forecast.samples[0].precipitation_chance, 35);
    assert_eq!(forecast.samples[1].condition, "overcast clouds");
}

#[tokio::test]
async fn reverse_geocode_returns_relevance_ordered_places() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "Bengaluru", "state": "Karnataka", "country": "IN" }
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let places = client
        .reverse_geocode(&Coordinate::new(12.97, 77.59))
        .await
        .unwrap();

    assert_eq!(places.len(), 1);
    assert_eq!(places[0].to_string(), "Bengaluru, Karnataka, IN");
}

#[tokio::test]
async fn reverse_geocode_tolerates_no_matches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let places = client
        .reverse_geocode(&Coordinate::new(0.0, 0.0))
        .await
        .unwrap();
    assert!(places.is_empty());
}

#[tokio::test]
async fn rate_limit_status_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .fetch_current(&Coordinate::new(1.0, 2.0))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FetchError::RateLimited {
            retry_after: Some(30)
        }
    );
}

#[tokio::test]
async fn server_error_maps_to_upstream_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .fetch_forecast(&Coordinate::new(1.0, 2.0))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Upstream { status: 500 });
}

#[tokio::test]
async fn malformed_body_maps_to_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .fetch_current(&Coordinate::new(1.0, 2.0))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn ip_lookup_resolves_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "lat": 47.6062,
            "lon": -122.3321
        })))
        .mount(&server)
        .await;

    let source = IpLocationSource::with_endpoint(format!("{}/json", server.uri())).unwrap();
    let coord = source.locate().await.unwrap();
    assert_eq!(coord, Coordinate::new(47.6062, -122.3321));
}

#[tokio::test]
async fn ip_lookup_failure_maps_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "fail",
            "message": "private range"
        })))
        .mount(&server)
        .await;

    let source = IpLocationSource::with_endpoint(format!("{}/json", server.uri())).unwrap();
    let err = source.locate().await.unwrap_err();
    assert_eq!(err, LocationError::Unavailable("private range".to_string()));
}
