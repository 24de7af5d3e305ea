//! Persistent, bounded request history.
//!
//! The log is a newest-first list stored as one JSON array in a
//! [`KeyValueStore`]. Each completed dispatch is inserted at the head and the
//! oldest entries beyond the configured bound are evicted. Every write goes
//! through [`StoreExt::modify`], which the store serializes per store rather
//! than per log, so concurrent completions are recorded in completion order
//! and none is lost even when several logs share one key.

use super::models::{HistoryEntry, HistoryError};
use super::search;
use crate::config::get_config;
use crate::storage::{KeyValueStore, StoreExt, HISTORY_KEY};
use std::sync::Arc;

/// Configuration for a history log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of entries to keep.
    pub max_entries: usize,

    /// Whether each entry keeps the full response outcome.
    pub store_responses: bool,

    /// Whether to strip credential-bearing headers before storage.
    pub sanitize_sensitive_headers: bool,
}

impl HistoryConfig {
    /// Creates a config with the given bound and default flags.
    pub fn with_limit(max_entries: usize) -> Self {
        Self {
            max_entries,
            store_responses: true,
            sanitize_sensitive_headers: true,
        }
    }

    /// The main history, bounded by `historyLimit` from the global configuration.
    pub fn from_global_config() -> Self {
        Self::with_limit(get_config().history_limit)
    }

    /// The "recent requests" list, bounded by `recentHistoryLimit`.
    ///
    /// Recent entries keep only the summary, not the response payload.
    pub fn recent_from_global_config() -> Self {
        Self {
            store_responses: false,
            ..Self::with_limit(get_config().recent_history_limit)
        }
    }
}

impl Default for HistoryConfig {
    /// Creates a default HistoryConfig using global configuration.
    fn default() -> Self {
        Self::from_global_config()
    }
}

/// A bounded, persisted, newest-first history log.
pub struct HistoryLog {
    store: Arc<dyn KeyValueStore>,
    key: String,
    config: HistoryConfig,
}

impl std::fmt::Debug for HistoryLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLog")
            .field("key", &self.key)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HistoryLog {
    /// Opens the log stored under the standard history key.
    pub fn new(store: Arc<dyn KeyValueStore>, config: HistoryConfig) -> Self {
        Self::with_key(store, HISTORY_KEY, config)
    }

    /// Opens a log stored under a custom key.
    pub fn with_key(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        config: HistoryConfig,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            config,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Inserts an entry at the head and evicts past the bound.
    ///
    /// The entry is prepared for storage first: its response payload is
    /// dropped when the log does not keep responses or when it is too large,
    /// and sensitive headers are stripped if configured.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError` if the store cannot be read or written. The log
    /// is unchanged in that case.
    pub fn record(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut entry = entry.prepare_for_storage(self.config.sanitize_sensitive_headers);
        if !self.config.store_responses {
            entry.response = None;
        }

        let key = &self.key;
        let max_entries = self.config.max_entries;
        let mut entry = Some(entry);
        self.store.modify(key, |entries: &mut Vec<HistoryEntry>| {
            if let Some(entry) = entry.take() {
                entries.insert(0, entry);
            }
            if entries.len() > max_entries {
                let evicted = entries.len() - max_entries;
                entries.truncate(max_entries);
                log::debug!("History '{}' evicted {} oldest entries", key, evicted);
            }
        })?;
        Ok(())
    }

    /// All entries, newest first.
    pub fn entries(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        self.load()
    }

    /// The most recent `count` entries.
    pub fn recent(&self, count: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut entries = self.load()?;
        entries.truncate(count);
        Ok(entries)
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: &str) -> Result<Option<HistoryEntry>, HistoryError> {
        Ok(self.load()?.into_iter().find(|entry| entry.id == id))
    }

    pub fn len(&self) -> Result<usize, HistoryError> {
        Ok(self.load()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, HistoryError> {
        Ok(self.len()? == 0)
    }

    /// Removes an entry by id.
    ///
    /// # Returns
    ///
    /// `true` if an entry was removed.
    pub fn remove(&self, id: &str) -> Result<bool, HistoryError> {
        let mut removed = false;
        self.store
            .modify(&self.key, |entries: &mut Vec<HistoryEntry>| {
                let before = entries.len();
                entries.retain(|entry| entry.id != id);
                removed = entries.len() != before;
            })?;
        Ok(removed)
    }

    /// Deletes every entry.
    pub fn clear(&self) -> Result<(), HistoryError> {
        self.store.delete(&self.key)?;
        Ok(())
    }

    /// Entries whose URL or method contains `query` (case-insensitive).
    pub fn search(&self, query: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(search::search_history(query, &self.load()?))
    }

    /// Entries for dispatches that produced no HTTP response.
    pub fn filter_failures(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(search::filter_failures(&self.load()?))
    }

    /// Entries with the given HTTP status.
    pub fn filter_by_status(&self, status: u16) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(search::filter_by_status(status, &self.load()?))
    }

    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self
            .store
            .load::<Vec<HistoryEntry>>(&self.key)?
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CompiledRequest, FailureKind, HttpMethod, ResponseBody, ResponseData, ResponseFailure,
        ResponseFormat, ResponseOutcome,
    };
    use crate::storage::MemoryStore;
    use std::collections::HashMap;
    use std::thread;

    fn request(url: &str) -> CompiledRequest {
        CompiledRequest {
            method: HttpMethod::GET,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    fn ok(status: u16) -> ResponseOutcome {
        ResponseOutcome::Success(ResponseData {
            status,
            status_text: String::new(),
            headers: HashMap::new(),
            data: ResponseBody::Text("body".to_string()),
            elapsed_ms: 3,
            size: 4,
            format: ResponseFormat::Text,
            parse_degraded: false,
        })
    }

    fn entry(url: &str) -> HistoryEntry {
        HistoryEntry::from_outcome(&request(url), &ok(200), true)
    }

    fn log_with_limit(limit: usize) -> HistoryLog {
        HistoryLog::new(Arc::new(MemoryStore::new()), HistoryConfig::with_limit(limit))
    }

    #[test]
    fn test_newest_first() {
        let log = log_with_limit(10);
        log.record(entry("http://h/1")).unwrap();
        log.record(entry("http://h/2")).unwrap();
        log.record(entry("http://h/3")).unwrap();

        let urls: Vec<String> = log.entries().unwrap().into_iter().map(|e| e.url).collect();
        assert_eq!(urls, vec!["http://h/3", "http://h/2", "http://h/1"]);
    }

    #[test]
    fn test_evicts_oldest_past_bound() {
        let log = log_with_limit(3);
        for i in 1..=4 {
            log.record(entry(&format!("http://h/{}", i))).unwrap();
        }

        let urls: Vec<String> = log.entries().unwrap().into_iter().map(|e| e.url).collect();
        assert_eq!(urls, vec!["http://h/4", "http://h/3", "http://h/2"]);
    }

    #[test]
    fn test_failures_are_recorded() {
        let log = log_with_limit(10);
        let failure = ResponseOutcome::Failure(ResponseFailure {
            kind: FailureKind::Network,
            message: "Network error: connection refused".to_string(),
            elapsed_ms: 2,
        });
        log.record(HistoryEntry::from_outcome(&request("http://h"), &failure, true))
            .unwrap();
        log.record(entry("http://h/ok")).unwrap();

        assert_eq!(log.filter_failures().unwrap().len(), 1);
        assert_eq!(log.filter_by_status(200).unwrap().len(), 1);
    }

    #[test]
    fn test_summary_only_config_drops_payload() {
        let config = HistoryConfig {
            store_responses: false,
            ..HistoryConfig::with_limit(5)
        };
        let log = HistoryLog::new(Arc::new(MemoryStore::new()), config);
        log.record(entry("http://h")).unwrap();

        let stored = &log.entries().unwrap()[0];
        assert!(stored.response.is_none());
        assert_eq!(stored.status, Some(200));
    }

    #[test]
    fn test_remove_and_clear() {
        let log = log_with_limit(10);
        let first = entry("http://h/1");
        let id = first.id.clone();
        log.record(first).unwrap();
        log.record(entry("http://h/2")).unwrap();

        assert!(log.get(&id).unwrap().is_some());
        assert!(log.remove(&id).unwrap());
        assert!(!log.remove(&id).unwrap());
        assert_eq!(log.len().unwrap(), 1);

        log.clear().unwrap();
        assert!(log.is_empty().unwrap());
    }

    #[test]
    fn test_search_and_recent() {
        let log = log_with_limit(10);
        log.record(entry("http://h/users")).unwrap();
        log.record(entry("http://h/orders")).unwrap();

        assert_eq!(log.search("USERS").unwrap().len(), 1);
        let recent = log.recent(1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].url, "http://h/orders");
    }

    #[test]
    fn test_persists_across_instances() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let log = HistoryLog::new(store.clone(), HistoryConfig::with_limit(10));
        log.record(entry("http://h")).unwrap();

        let reopened = HistoryLog::new(store, HistoryConfig::with_limit(10));
        assert_eq!(reopened.len().unwrap(), 1);
    }

    #[test]
    fn test_separate_keys_are_independent() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let main = HistoryLog::new(store.clone(), HistoryConfig::with_limit(10));
        let recent = HistoryLog::with_key(store, "recent", HistoryConfig::with_limit(10));

        main.record(entry("http://h")).unwrap();
        assert!(recent.is_empty().unwrap());
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let log = Arc::new(log_with_limit(100));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let log = log.clone();
                thread::spawn(move || {
                    log.record(entry(&format!("http://h/{}", i))).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.len().unwrap(), 16);
    }

    #[test]
    fn test_logs_sharing_a_key_lose_nothing() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let first = Arc::new(HistoryLog::new(store.clone(), HistoryConfig::with_limit(100)));
        let second = Arc::new(HistoryLog::new(store, HistoryConfig::with_limit(100)));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let log = if i % 2 == 0 { first.clone() } else { second.clone() };
                thread::spawn(move || {
                    log.record(entry(&format!("http://h/{}", i))).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(first.len().unwrap(), 16);
        assert_eq!(second.len().unwrap(), 16);
    }
}
