//! In-process store.

use super::{KeyValueStore, StorageError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// A [`KeyValueStore`] backed by a map in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<Value>) -> Result<Value, StorageError>,
    ) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        let value = apply(entries.get(key).cloned())?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_set_delete() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("k", json!({"a": 1})).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!({"a": 1})));
        assert_eq!(store.len(), 1);

        store.set("k", json!("replaced")).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!("replaced")));

        store.delete("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_update_sees_current_value() {
        let store = MemoryStore::new();
        store
            .update("n", &mut |current: Option<Value>| {
                assert_eq!(current, None);
                Ok(json!(1))
            })
            .unwrap();
        store
            .update("n", &mut |current: Option<Value>| {
                let n = current.and_then(|v| v.as_i64()).unwrap_or(0);
                Ok(json!(n + 1))
            })
            .unwrap();
        assert_eq!(store.get("n").unwrap(), Some(json!(2)));
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let store = MemoryStore::new();
        store.set("k", json!("kept")).unwrap();

        let result = store.update("k", &mut |_: Option<Value>| -> Result<Value, StorageError> {
            Err(StorageError::InvalidKey("k".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(store.get("k").unwrap(), Some(json!("kept")));
    }

    #[test]
    fn test_delete_absent_key() {
        let store = MemoryStore::new();
        assert!(store.delete("missing").is_ok());
    }
}
