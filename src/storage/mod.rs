//! Persistence store interface.
//!
//! Saved requests, history, environments and the active-environment pointer are
//! all persisted through a [`KeyValueStore`]: a string-keyed map of JSON values.
//! Components receive the store explicitly instead of reaching for a global.
//!
//! Two implementations are provided: [`MemoryStore`] for tests and embedding,
//! and [`FileStore`] which keeps one JSON document per key in a directory.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Key holding the list of saved requests.
pub const SAVED_REQUESTS_KEY: &str = "api_tester_saved_requests";

/// Key holding the request history log.
pub const HISTORY_KEY: &str = "api_tester_history";

/// Key holding the short "recent requests" list, summaries only.
pub const RECENT_KEY: &str = "api_tester_recent";

/// Key holding the list of environments.
pub const ENVIRONMENTS_KEY: &str = "api_tester_environments";

/// Key holding the id of the active environment.
pub const CURRENT_ENV_KEY: &str = "api_tester_current_env";

/// Key holding request collections.
pub const COLLECTIONS_KEY: &str = "api_tester_collections";

/// Key holding user preferences.
pub const PREFERENCES_KEY: &str = "api_tester_preferences";

/// Every key this crate writes.
pub const ALL_KEYS: &[&str] = &[
    SAVED_REQUESTS_KEY,
    HISTORY_KEY,
    RECENT_KEY,
    ENVIRONMENTS_KEY,
    CURRENT_ENV_KEY,
    COLLECTIONS_KEY,
    PREFERENCES_KEY,
];

/// Errors that can occur while reading or writing a store.
#[derive(Debug)]
pub enum StorageError {
    /// Underlying I/O failure.
    Io(std::io::Error),

    /// A value could not be encoded or decoded.
    Serialization(serde_json::Error),

    /// The key cannot be mapped onto the store's namespace.
    InvalidKey(String),

    /// A lock guarding the store was poisoned.
    Lock(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "Storage I/O error: {}", err),
            StorageError::Serialization(err) => write!(f, "Storage serialization error: {}", err),
            StorageError::InvalidKey(key) => write!(f, "Invalid storage key: '{}'", key),
            StorageError::Lock(msg) => write!(f, "Storage lock error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(err) => Some(err),
            StorageError::Serialization(err) => Some(err),
            StorageError::InvalidKey(_) | StorageError::Lock(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err)
    }
}

/// A string-keyed store of JSON values.
///
/// Implementations must be safe to share across threads; every method takes
/// `&self`.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Replaces the value under `key` with `apply(current)`.
    ///
    /// `apply` is called exactly once. Updates to the same store are
    /// serialized, so two writers sharing a store never lose each other's
    /// changes. If `apply` fails nothing is written.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<Value>) -> Result<Value, StorageError>,
    ) -> Result<(), StorageError>;
}

/// Typed helpers over any [`KeyValueStore`].
pub trait StoreExt: KeyValueStore {
    /// Loads and deserializes the value under `key`.
    ///
    /// A value that exists but does not decode as `T` is logged and treated as
    /// absent, so a corrupted entry never blocks startup.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(value) = self.get(key)? else {
            return Ok(None);
        };

        match serde_json::from_value(value) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(err) => {
                log::warn!("Ignoring corrupted store entry '{}': {}", key, err);
                Ok(None)
            }
        }
    }

    /// Serializes `value` and stores it under `key`.
    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        self.set(key, serde_json::to_value(value)?)
    }

    /// Read-modify-write of the value under `key` through [`KeyValueStore::update`].
    ///
    /// An absent or corrupted entry starts from `T::default()`.
    fn modify<T, F>(&self, key: &str, mut f: F) -> Result<(), StorageError>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnMut(&mut T),
    {
        self.update(key, &mut |current: Option<Value>| {
            let mut value = match current {
                Some(value) => serde_json::from_value(value).unwrap_or_else(|err| {
                    log::warn!("Ignoring corrupted store entry '{}': {}", key, err);
                    T::default()
                }),
                None => T::default(),
            };
            f(&mut value);
            Ok(serde_json::to_value(&value)?)
        })
    }
}

impl<S: KeyValueStore + ?Sized> StoreExt for S {}

/// Removes every key this crate writes.
pub fn clear_all(store: &dyn KeyValueStore) -> Result<(), StorageError> {
    for key in ALL_KEYS {
        store.delete(key)?;
    }
    Ok(())
}
