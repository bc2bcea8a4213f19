//! Feed endpoint contract tests.
//!
//! Verifies against a mock HTTP server that the fetcher sends the expected
//! request and maps every failure class onto `FetchError`.

use std::time::Duration;

use meridian_feed::feed::{FeedSource, FetchError, HttpFeedSource, Priority};
use meridian_feed::status::SourceState;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fixture() -> serde_json::Value {
    let s = std::fs::read_to_string("tests/fixtures/feed_ok.json").expect("fixture");
    serde_json::from_str(&s).expect("fixture json")
}

async fn source_for(server: &MockServer) -> HttpFeedSource {
    HttpFeedSource::new(format!("{}/feed", server.uri())).with_timeout(Duration::from_secs(2))
}

#[tokio::test]
async fn get_with_json_accept_header_decodes_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture()))
        .expect(1)
        .mount(&server)
        .await;

    let resp = source_for(&server).await.fetch().await.expect("fetch ok");

    assert_eq!(resp.entries.len(), 3);
    assert_eq!(resp.entries[0].priority, Priority::Flash);
    assert_eq!(resp.entries[2].priority, Priority::Routine, "unknown label");
    assert_eq!(resp.event_count(), 3);
    assert_eq!(resp.updated_display.as_deref(), Some("28 FEB 2026 / 17:31 IST"));
    assert_eq!(resp.sources_status["OSINT"], SourceState::Cached);
    assert_eq!(resp.sources_status["AP"], SourceState::Down("timeout".into()));
}

#[tokio::test]
async fn non_2xx_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(503).set_body_json(fixture()))
        .mount(&server)
        .await;

    let err = source_for(&server).await.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Http { status: 503 }), "{err:?}");
}

#[tokio::test]
async fn non_json_body_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = source_for(&server).await.fetch().await.unwrap_err();
    assert_eq!(err.kind(), "protocol");
}

#[tokio::test]
async fn wrong_status_or_entries_shape_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "error", "entries": []})),
        )
        .mount(&server)
        .await;
    let err = source_for(&server).await.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Protocol(_)));

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "entries": "none"})),
        )
        .mount(&server)
        .await;
    let err = source_for(&server).await.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Protocol(_)));
}

#[tokio::test]
async fn slow_endpoint_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixture())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let src = HttpFeedSource::new(format!("{}/feed", server.uri()))
        .with_timeout(Duration::from_millis(200));
    let err = src.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_endpoint_is_network_error() {
    // Port 9 (discard) on localhost is not expected to be listening.
    let src = HttpFeedSource::new("http://127.0.0.1:9/feed").with_timeout(Duration::from_secs(2));
    let err = src.fetch().await.unwrap_err();
    assert_eq!(err.kind(), "network");
}
