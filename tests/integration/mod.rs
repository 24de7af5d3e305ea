//! Integration tests module for apicraft
//!
//! Shared helpers for tests that drive the dispatcher and client against an
//! in-process HTTP server.

pub mod client_test;
pub mod dispatch_test;
pub mod persistence_test;

use apicraft::client::ApiClient;
use apicraft::environment::EnvironmentManager;
use apicraft::executor::{DispatchConfig, Dispatcher};
use apicraft::history::{HistoryConfig, HistoryLog};
use apicraft::storage::{KeyValueStore, MemoryStore};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Transport settings that do not depend on the global configuration.
pub fn test_dispatch_config() -> DispatchConfig {
    DispatchConfig {
        follow_redirects: true,
        max_redirects: 10,
        validate_ssl: true,
        user_agent: "apicraft-tests".to_string(),
    }
}

pub fn test_dispatcher() -> Dispatcher {
    init_test_env();
    Dispatcher::new(test_dispatch_config()).expect("dispatcher should build")
}

/// A client over the given store with a history bound of `history_limit`.
pub fn test_client_with_store(store: Arc<dyn KeyValueStore>, history_limit: usize) -> ApiClient {
    let environments = EnvironmentManager::load(store.clone()).expect("environments should load");
    let history = Arc::new(HistoryLog::new(
        store,
        HistoryConfig::with_limit(history_limit),
    ));
    ApiClient::new(test_dispatcher(), environments, history)
}

pub fn test_client(history_limit: usize) -> ApiClient {
    test_client_with_store(Arc::new(MemoryStore::new()), history_limit)
}
