//! Dispatcher behavior against a live local server.

use super::test_dispatcher;
use apicraft::compiler::{compile, compile_without_environment};
use apicraft::models::{
    BodyType, CompiledRequest, FailureKind, HttpMethod, RequestDescription, ResponseBody,
    ResponseFormat, ResponseOutcome,
};
use apicraft::variables::Bindings;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn get(url: String) -> CompiledRequest {
    compile_without_environment(&RequestDescription::new(HttpMethod::GET, url))
}

#[tokio::test]
async fn test_error_status_is_success_with_parsed_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;

    let outcome = test_dispatcher()
        .dispatch(&get(format!("{}/missing", server.uri())), 5_000)
        .await;

    let data = outcome.as_success().expect("any HTTP status is a success");
    assert_eq!(data.status, 404);
    assert_eq!(data.status_text, "Not Found");
    assert_eq!(data.format, ResponseFormat::Json);
    assert_eq!(data.data, ResponseBody::Json(json!({"error": "not found"})));
    assert!(!data.parse_degraded);
}

#[tokio::test]
async fn test_server_error_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let outcome = test_dispatcher()
        .dispatch(&get(server.uri()), 5_000)
        .await;

    assert!(outcome.is_success());
    assert_eq!(outcome.status(), Some(503));
}

#[tokio::test]
async fn test_malformed_json_degrades_to_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string("{not json"),
        )
        .mount(&server)
        .await;

    let outcome = test_dispatcher()
        .dispatch(&get(server.uri()), 5_000)
        .await;

    let data = outcome.as_success().unwrap();
    assert_eq!(data.data, ResponseBody::Text("{not json".to_string()));
    assert!(data.parse_degraded);
    assert_eq!(data.size, 9);
}

#[tokio::test]
async fn test_timeout_is_reported_close_to_the_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1_500)))
        .mount(&server)
        .await;

    let outcome = test_dispatcher()
        .dispatch(&get(server.uri()), 100)
        .await;

    let failure = outcome.as_failure().expect("slow response should time out");
    assert_eq!(failure.kind, FailureKind::Timeout);
    assert_eq!(failure.message, "Request timed out after 100ms");
    assert!(failure.elapsed_ms >= 100);
    assert!(failure.elapsed_ms < 200, "took {}ms", failure.elapsed_ms);
}

#[tokio::test]
async fn test_cancel_resolves_as_aborted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let in_flight = test_dispatcher().start(get(server.uri()), 10_000);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(in_flight.cancel());

    let outcome = in_flight.outcome().await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Aborted));
    assert!(outcome.elapsed_ms() < 1_500);
}

#[tokio::test]
async fn test_cancel_after_completion_is_noop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let in_flight = test_dispatcher().start(get(server.uri()), 5_000);
    let handle = in_flight.cancel_handle();
    let outcome = in_flight.outcome().await;

    assert_eq!(outcome.status(), Some(204));
    assert!(!handle.cancel());
    assert!(!handle.is_cancelled());
}

#[tokio::test]
async fn test_headers_query_and_body_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(query_param("page", "2"))
        .and(header("x-api-key", "k-123"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"name":"Ada"}"#))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut bindings = Bindings::new();
    bindings.insert("base".to_string(), server.uri());
    bindings.insert("key".to_string(), "k-123".to_string());
    bindings.insert("name".to_string(), "Ada".to_string());

    let description = RequestDescription::new(HttpMethod::POST, "{{base}}/users")
        .with_param("page", "2")
        .with_header("X-Api-Key", "{{key}}")
        .with_body(r#"{"name":"{{name}}"}"#, BodyType::Json);

    let outcome = test_dispatcher()
        .dispatch(&compile(&description, &bindings), 5_000)
        .await;

    assert_eq!(outcome.status(), Some(201));
}

#[tokio::test]
async fn test_get_never_sends_a_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let description =
        RequestDescription::new(HttpMethod::GET, server.uri()).with_body("ignored", BodyType::Text);
    let outcome = test_dispatcher()
        .dispatch(&compile_without_environment(&description), 5_000)
        .await;
    assert!(outcome.is_success());

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].body.is_empty());
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/new", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
        .mount(&server)
        .await;

    let outcome = test_dispatcher()
        .dispatch(&get(format!("{}/old", server.uri())), 5_000)
        .await;

    let data = outcome.as_success().unwrap();
    assert_eq!(data.status, 200);
    assert_eq!(data.data, ResponseBody::Text("moved here".to_string()));
}

#[tokio::test]
async fn test_concurrent_dispatches_are_independent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dispatcher = test_dispatcher();
    let slow = dispatcher.start(get(format!("{}/slow", server.uri())), 5_000);
    let fast = dispatcher.start(get(format!("{}/fast", server.uri())), 5_000);

    slow.cancel();
    let (slow, fast) = tokio::join!(slow.outcome(), fast.outcome());

    assert_eq!(slow.failure_kind(), Some(FailureKind::Aborted));
    assert!(matches!(fast, ResponseOutcome::Success(_)));
}
