//! Integration tests for EventsClient using wiremock.

use citypulse_core::{Provider, ProviderError};
use citypulse_providers::EventsClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn event(id: &str, name: &str, date: &str, widths: &[u32]) -> serde_json::Value {
    let images: Vec<_> = widths
        .iter()
        .map(|w| {
            serde_json::json!({
                "ratio": "16_9",
                "url": format!("https://img.example/{id}-{w}.jpg"),
                "width": w,
                "height": w * 9 / 16,
                "fallback": false
            })
        })
        .collect();

    serde_json::json!({
        "name": name,
        "type": "event",
        "id": id,
        "url": format!("https://www.ticketmaster.es/event/{id}"),
        "locale": "es-es",
        "images": images,
        "dates": { "start": { "localDate": date, "localTime": "20:00:00" } },
        "_embedded": { "venues": [{ "name": "Palau Sant Jordi", "city": { "name": "Barcelona" } }] }
    })
}

#[tokio::test]
async fn test_search_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events.json"))
        .and(query_param("apikey", "tm-key"))
        .and(query_param("city", "Barcelona"))
        .and(query_param("countryCode", "ES"))
        .and(query_param("size", "10"))
        .and(query_param("sort", "date,asc"))
        .and(query_param("locale", "es-ES"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "_embedded": { "events": [
                event("a", "Primavera Sound", "2025-06-05", &[640, 1024]),
                event("b", "Concierto", "2025-06-07", &[320]),
            ] },
            "page": { "size": 10, "totalElements": 42, "totalPages": 5, "number": 0 }
        })))
        .mount(&mock_server)
        .await;

    let client = EventsClient::new(&mock_server.uri(), Some("tm-key".into()));
    let page = client.search("Barcelona", 0).await.unwrap();

    assert_eq!(page.events.len(), 2);
    assert_eq!(page.total_elements, 42);
    assert_eq!(page.total_pages, 5);
    assert_eq!(page.events[0].name, "Primavera Sound");
    assert_eq!(page.events[0].images.len(), 2);
    assert_eq!(
        page.events[0].venue.as_ref().map(|v| v.name.as_str()),
        Some("Palau Sant Jordi")
    );
}

#[tokio::test]
async fn test_search_without_embedded_events() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "page": { "size": 10, "totalElements": 0, "totalPages": 0, "number": 0 }
        })))
        .mount(&mock_server)
        .await;

    let client = EventsClient::new(&mock_server.uri(), Some("tm-key".into()));
    let page = client.search("Soria", 0).await.unwrap();
    assert!(page.events.is_empty());
    assert_eq!(page.total_elements, 0);
}

#[tokio::test]
async fn test_invalid_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events.json"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "fault": { "faultstring": "Invalid ApiKey", "detail": { "errorcode": "oauth.v2.InvalidApiKey" } }
        })))
        .mount(&mock_server)
        .await;

    let client = EventsClient::new(&mock_server.uri(), Some("bad".into()));
    let err = client.search("Madrid", 0).await.unwrap_err();
    assert!(matches!(err, ProviderError::Unauthorized { provider: Provider::Events }));
}

#[tokio::test]
async fn test_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events.json"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = EventsClient::new(&mock_server.uri(), Some("tm-key".into()));
    let err = client.search("Madrid", 0).await.unwrap_err();
    assert!(matches!(err, ProviderError::RateLimited { provider: Provider::Events }));
    assert_eq!(err.user_message(), "Too many requests. Please wait and try again.");
}

#[tokio::test]
async fn test_not_found_names_the_city() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events.json"))
        .and(query_param("city", "Barcelona"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "errors": ["Resource not found"]
        })))
        .mount(&mock_server)
        .await;

    let client = EventsClient::new(&mock_server.uri(), Some("tm-key".into()));
    match client.search("Barcelona", 0).await.unwrap_err() {
        ProviderError::NotFound { provider, what } => {
            assert_eq!(provider, Provider::Events);
            assert_eq!(what, "Barcelona");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events.json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;

    let client = EventsClient::new(&mock_server.uri(), Some("tm-key".into()));
    match client.search("Madrid", 0).await.unwrap_err() {
        ProviderError::Rejected { status, message, .. } => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
