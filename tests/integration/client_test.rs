//! Client pipeline: environments, compile, dispatch, history.

use super::test_client;
use apicraft::models::{
    AuthConfig, FailureKind, HttpMethod, RequestDescription, ResponseBody,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_active_environment_drives_the_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("authorization", "Bearer dev-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": "ada"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(10);
    let env = client.environments().create_environment("dev").unwrap();
    client
        .environments()
        .set_variable(&env, "baseUrl", &format!("{}/v1", server.uri()))
        .unwrap();
    client
        .environments()
        .set_variable(&env, "token", "dev-token")
        .unwrap();
    client.environments().set_active(&env).unwrap();

    let description = RequestDescription::new(HttpMethod::GET, "{{baseUrl}}/me").with_auth(
        AuthConfig::Bearer {
            token: "{{token}}".to_string(),
        },
    );
    let outcome = client.send(&description).await;

    let data = outcome.as_success().unwrap();
    assert_eq!(data.data, ResponseBody::Json(json!({"user": "ada"})));

    let history = client.history().entries().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].url, format!("{}/v1/me", server.uri()));
    assert_eq!(history[0].status, Some(200));
}

#[tokio::test]
async fn test_unbound_placeholders_are_sent_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = test_client(10);
    let description =
        RequestDescription::new(HttpMethod::GET, server.uri()).with_header("X-Trace", "{{trace}}");
    client.send(&description).await;

    let received = server.received_requests().await.unwrap();
    assert_eq!(
        received[0].headers.get("x-trace").unwrap().to_str().unwrap(),
        "{{trace}}"
    );
}

#[tokio::test]
async fn test_history_is_newest_first_and_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = test_client(3);
    for i in 1..=4 {
        client
            .send(&RequestDescription::new(
                HttpMethod::GET,
                format!("{}/r/{}", server.uri(), i),
            ))
            .await;
    }

    let urls: Vec<String> = client
        .history()
        .entries()
        .unwrap()
        .into_iter()
        .map(|entry| entry.url)
        .collect();
    let expected: Vec<String> = [4, 3, 2]
        .iter()
        .map(|i| format!("{}/r/{}", server.uri(), i))
        .collect();
    assert_eq!(urls, expected);
}

#[tokio::test]
async fn test_failures_are_recorded_without_status() {
    let client = test_client(10);
    let outcome = client
        .send(&RequestDescription::new(HttpMethod::GET, "http://127.0.0.1:9/"))
        .await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Network));

    let history = client.history().entries().unwrap();
    assert_eq!(history[0].status, None);
    assert_eq!(history[0].failure, Some(FailureKind::Network));
}

#[tokio::test]
async fn test_description_timeout_is_enforced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = test_client(10);
    let description =
        RequestDescription::new(HttpMethod::GET, server.uri()).with_timeout_ms(150);
    let outcome = client.send(&description).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Timeout));
    assert!(outcome.elapsed_ms() >= 150);
    assert_eq!(
        client.history().entries().unwrap()[0].failure,
        Some(FailureKind::Timeout)
    );
}

#[tokio::test]
async fn test_cancelled_start_is_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = test_client(10);
    let in_flight = client.start(&RequestDescription::new(HttpMethod::GET, server.uri()));
    let id = in_flight.request_id().to_string();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(client.in_flight(), vec![id.clone()]);
    assert!(client.cancel(&id));

    let outcome = in_flight.outcome().await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Aborted));
    assert!(client.in_flight().is_empty());
    assert_eq!(
        client.history().entries().unwrap()[0].failure,
        Some(FailureKind::Aborted)
    );
}

#[tokio::test]
async fn test_dropped_send_is_cancelled_and_untracked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let client = test_client(10);
    let description = RequestDescription::new(HttpMethod::GET, server.uri());
    let result = tokio::time::timeout(Duration::from_millis(100), client.send(&description)).await;
    assert!(result.is_err());

    // The background dispatch observes the cancel and records itself
    for _ in 0..100 {
        if !client.history().is_empty().unwrap() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(client.in_flight().is_empty());
    let history = client.history().entries().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].failure, Some(FailureKind::Aborted));
}

#[tokio::test]
async fn test_environment_edits_do_not_affect_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .mount(&server)
        .await;

    let client = test_client(10);
    let env = client.environments().create_environment("dev").unwrap();
    client.environments().set_variable(&env, "p", "a").unwrap();
    client.environments().set_active(&env).unwrap();

    let in_flight = client.start(&RequestDescription::new(
        HttpMethod::GET,
        format!("{}/{{{{p}}}}", server.uri()),
    ));
    client.environments().set_variable(&env, "p", "b").unwrap();

    let outcome = in_flight.outcome().await;
    assert_eq!(outcome.status(), Some(200));
}
