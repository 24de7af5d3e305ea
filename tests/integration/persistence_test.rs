//! State that must survive reopening a file-backed store.

use super::{init_test_env, test_client_with_store};
use apicraft::client::ApiClient;
use apicraft::collections::{Collections, SavedRequest, SavedRequests};
use apicraft::config::{get_config, load_config, reset_config};
use apicraft::models::{BodyType, HttpMethod, RequestDescription};
use apicraft::storage::{FileStore, KeyValueStore, RECENT_KEY};
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn open_store(dir: &TempDir) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::open(dir.path()).expect("store should open"))
}

#[tokio::test]
async fn test_environments_and_history_survive_reopen() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    {
        let client = test_client_with_store(open_store(&dir), 10);
        let env = client.environments().create_environment("staging").unwrap();
        client
            .environments()
            .set_variable(&env, "base", &server.uri())
            .unwrap();
        client.environments().set_active(&env).unwrap();
        client
            .send(&RequestDescription::new(HttpMethod::GET, "{{base}}/ping"))
            .await;
    }

    let client = test_client_with_store(open_store(&dir), 10);
    let active = client.environments().active_environment().unwrap();
    assert_eq!(active.name, "staging");
    assert_eq!(active.get("base"), Some(server.uri().as_str()));

    let history = client.history().entries().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].url, format!("{}/ping", server.uri()));
}

#[test]
fn test_saved_requests_and_collections_survive_reopen() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    let description = RequestDescription::new(HttpMethod::POST, "{{base}}/users")
        .with_header("Accept", "application/json")
        .with_body(r#"{"name":"{{name}}"}"#, BodyType::Json);

    let collection_id = {
        let store = open_store(&dir);
        SavedRequests::new(store.clone())
            .save("create user", description.clone())
            .unwrap();

        let collections = Collections::new(store);
        let id = collections.create("Users").unwrap();
        collections
            .add_request(&id, SavedRequest::new("create", description.clone()).unwrap())
            .unwrap();
        id
    };

    let store = open_store(&dir);
    let saved = SavedRequests::new(store.clone()).list().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].config, description);

    let collection = Collections::new(store).get(&collection_id).unwrap();
    assert_eq!(collection.name, "Users");
    assert_eq!(collection.requests[0].config, description);
}

#[test]
fn test_corrupted_file_reads_as_empty() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("api_tester_saved_requests.json"), "{broken").unwrap();

    let saved = SavedRequests::new(open_store(&dir));
    assert!(saved.list().unwrap().is_empty());
    saved
        .save("fresh", RequestDescription::new(HttpMethod::GET, "http://h"))
        .unwrap();
    assert_eq!(saved.list().unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn test_open_applies_configured_history_limits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    load_config(Some(json!({
        "apicraft": { "historyLimit": 3, "recentHistoryLimit": 2 }
    })))
    .unwrap();
    assert_eq!(get_config().history_limit, 3);

    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let client = ApiClient::open(store.clone()).unwrap();
    for i in 0..5 {
        client
            .send(&RequestDescription::new(
                HttpMethod::GET,
                format!("{}/{}", server.uri(), i),
            ))
            .await;
    }
    reset_config();

    assert_eq!(client.history().len().unwrap(), 3);
    assert!(client.history().entries().unwrap()[0].response.is_some());

    let recent = client.recent().unwrap().entries().unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent.iter().all(|entry| entry.response.is_none()));
    assert!(store.get(RECENT_KEY).unwrap().is_some());
}
