//! Route tests driving the warp filters with `warp::test`.
//!
//! Upstream weather calls go to a wiremock server; geocoding is stubbed.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use weathercast_web::{routes, RequestHandler};
use weathercast_weather::{
    FetcherSettings, GeoMatch, GeocodeError, Geocoder, MemoryCache, WeatherFetcher,
    WeatherProvider,
};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Knows one address.
struct OneAddress;

#[async_trait]
impl Geocoder for OneAddress {
    async fn search(&self, query: &str) -> Result<Option<GeoMatch>, GeocodeError> {
        let found = matches!(query, "350 5th Ave, New York" | "10001").then(|| GeoMatch {
            postal_code: Some("10001".to_string()),
            country_code: Some("us".to_string()),
        });
        Ok(found)
    }
}

fn handler_for(server: &MockServer) -> Arc<RequestHandler> {
    let geocoder: Arc<dyn Geocoder> = Arc::new(OneAddress);
    let provider = WeatherProvider::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let settings = FetcherSettings {
        api_key: Some("test_api_key".to_string()),
        cache_ttl: Duration::from_secs(30 * 60),
    };
    let fetcher = WeatherFetcher::new(
        provider,
        geocoder.clone(),
        Arc::new(MemoryCache::new()),
        settings,
    );
    Arc::new(RequestHandler::new(geocoder, Arc::new(fetcher)))
}

async fn mount_new_york(server: &MockServer, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("zip", "10001,us"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "New York",
            "main": { "temp": 22, "temp_max": 25, "temp_min": 18 },
            "weather": [{ "description": "clear sky" }]
        })))
        .expect(calls)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("zip", "10001,us"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "list": [
                { "dt_txt": "2024-01-02 09:00:00", "main": { "temp": 17 }, "weather": [{ "description": "haze" }] },
                { "dt_txt": "2024-01-02 12:00:00", "main": { "temp": 20.5 }, "weather": [{ "description": "few clouds" }] }
            ]
        })))
        .expect(calls)
        .mount(server)
        .await;
}

fn body_text(body: &[u8]) -> String {
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_index_page() {
    let server = MockServer::start().await;
    let filter = routes(handler_for(&server));

    let response = warp::test::request()
        .method("GET")
        .path("/?notice=Hello%20there")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), 200);
    let body = body_text(response.body());
    assert!(body.contains("Hello there"));
    assert!(body.contains("name=\"address\""));
}

#[tokio::test]
async fn test_blank_address_redirects_home() {
    let server = MockServer::start().await;
    Mock::given(path_regex(".*"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let filter = routes(handler_for(&server));

    let response = warp::test::request()
        .method("GET")
        .path("/weather/fetch_weather?address=")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers()["location"],
        "/?notice=Address%20cannot%20be%20blank."
    );
}

#[tokio::test]
async fn test_missing_address_param_redirects_home() {
    let server = MockServer::start().await;
    let filter = routes(handler_for(&server));

    let response = warp::test::request()
        .method("POST")
        .path("/fetch_weather")
        .header("content-type", "application/x-www-form-urlencoded")
        .body("")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers()["location"],
        "/?notice=Address%20cannot%20be%20blank."
    );
}

#[tokio::test]
async fn test_unknown_address_redirects_home() {
    let server = MockServer::start().await;
    let filter = routes(handler_for(&server));

    let response = warp::test::request()
        .method("GET")
        .path("/weather/fetch_weather?address=Atlantis")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers()["location"],
        "/?notice=Invalid%20address.%20Please%20try%20again."
    );
}

#[tokio::test]
async fn test_form_post_renders_weather_then_serves_cache() {
    let server = MockServer::start().await;
    mount_new_york(&server, 1).await;
    let filter = routes(handler_for(&server));

    let first = warp::test::request()
        .method("POST")
        .path("/fetch_weather")
        .header("content-type", "application/x-www-form-urlencoded")
        .body("address=350+5th+Ave%2C+New+York")
        .reply(&filter)
        .await;

    assert_eq!(first.status(), 200);
    let body = body_text(first.body());
    assert!(body.contains("<h2>New York</h2>"));
    assert!(body.contains("Temperature: 22°C"));
    assert!(body.contains("2024-01-02 12:00:00 - 20.5°C, Few clouds"));
    assert!(!body.contains("pulled from cache"));

    let second = warp::test::request()
        .method("GET")
        .path("/weather/fetch_weather?address=10001")
        .reply(&filter)
        .await;

    assert_eq!(second.status(), 200);
    assert!(body_text(second.body()).contains("pulled from cache"));
}

#[tokio::test]
async fn test_upstream_failure_renders_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key"
        })))
        .mount(&server)
        .await;
    let filter = routes(handler_for(&server));

    let response = warp::test::request()
        .method("GET")
        .path("/weather/fetch_weather?address=10001")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), 200);
    let body = body_text(response.body());
    assert!(body.contains("Failed to fetch weather data"));
    assert!(!body.contains("Invalid API key"));
}
