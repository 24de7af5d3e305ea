//! Saved requests and collections.
//!
//! Two independent lists, each persisted as one JSON array in a
//! [`KeyValueStore`]:
//!
//! - [`SavedRequests`]: a newest-first list of named request descriptions.
//! - [`Collections`]: named groups of saved requests, in creation order.
//!
//! Every mutation is a read-modify-write under a lock, so concurrent callers
//! never overwrite each other's changes.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use apicraft::collections::Collections;
//! use apicraft::storage::MemoryStore;
//!
//! let collections = Collections::new(Arc::new(MemoryStore::new()));
//! let id = collections.create("Users API").unwrap();
//! assert_eq!(collections.get(&id).unwrap().name, "Users API");
//! ```

pub mod models;

pub use models::{Collection, CollectionError, SavedRequest};

use crate::models::RequestDescription;
use crate::storage::{KeyValueStore, StoreExt, COLLECTIONS_KEY, SAVED_REQUESTS_KEY};
use std::sync::{Arc, Mutex};

/// The persisted, newest-first list of saved requests.
pub struct SavedRequests {
    store: Arc<dyn KeyValueStore>,
    lock: Mutex<()>,
}

impl std::fmt::Debug for SavedRequests {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavedRequests").finish_non_exhaustive()
    }
}

impl SavedRequests {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Saves a request under a name and returns the new entry's id.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::InvalidName` for a blank name, or a storage
    /// error if the list cannot be persisted.
    pub fn save(
        &self,
        name: &str,
        config: RequestDescription,
    ) -> Result<String, CollectionError> {
        let saved = SavedRequest::new(name, config)?;
        let id = saved.id.clone();

        self.modify(|list| {
            list.insert(0, saved);
            Ok(())
        })?;

        log::info!("Saved request '{}' ({})", name.trim(), id);
        Ok(id)
    }

    /// All saved requests, newest first.
    pub fn list(&self) -> Result<Vec<SavedRequest>, CollectionError> {
        load_list(self.store.as_ref(), SAVED_REQUESTS_KEY)
    }

    pub fn get(&self, id: &str) -> Result<SavedRequest, CollectionError> {
        self.list()?
            .into_iter()
            .find(|saved| saved.id == id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))
    }

    pub fn delete(&self, id: &str) -> Result<(), CollectionError> {
        self.modify(|list| {
            let before = list.len();
            list.retain(|saved| saved.id != id);
            if list.len() == before {
                return Err(CollectionError::NotFound(id.to_string()));
            }
            Ok(())
        })
    }

    fn modify<F>(&self, f: F) -> Result<(), CollectionError>
    where
        F: FnOnce(&mut Vec<SavedRequest>) -> Result<(), CollectionError>,
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| CollectionError::Lock(e.to_string()))?;

        let mut list = load_list(self.store.as_ref(), SAVED_REQUESTS_KEY)?;
        f(&mut list)?;
        self.store.save(SAVED_REQUESTS_KEY, &list)?;
        Ok(())
    }
}

/// The persisted list of collections.
pub struct Collections {
    store: Arc<dyn KeyValueStore>,
    lock: Mutex<()>,
}

impl std::fmt::Debug for Collections {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collections").finish_non_exhaustive()
    }
}

impl Collections {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Creates an empty collection and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::InvalidName` if the name is blank.
    pub fn create(&self, name: &str) -> Result<String, CollectionError> {
        let collection = Collection::new(name)?;
        let id = collection.id.clone();

        self.modify(|list| {
            list.push(collection);
            Ok(())
        })?;

        log::info!("Created collection '{}' ({})", name.trim(), id);
        Ok(id)
    }

    /// All collections, in creation order.
    pub fn list(&self) -> Result<Vec<Collection>, CollectionError> {
        load_list(self.store.as_ref(), COLLECTIONS_KEY)
    }

    pub fn get(&self, id: &str) -> Result<Collection, CollectionError> {
        self.list()?
            .into_iter()
            .find(|collection| collection.id == id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))
    }

    pub fn delete(&self, id: &str) -> Result<(), CollectionError> {
        self.modify(|list| {
            let before = list.len();
            list.retain(|collection| collection.id != id);
            if list.len() == before {
                return Err(CollectionError::NotFound(id.to_string()));
            }
            Ok(())
        })
    }

    pub fn rename(&self, id: &str, name: &str) -> Result<(), CollectionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CollectionError::InvalidName(name.to_string()));
        }
        self.with_collection(id, |collection| {
            collection.name = name.to_string();
            Ok(())
        })
    }

    /// Appends a request to the end of a collection.
    pub fn add_request(&self, id: &str, request: SavedRequest) -> Result<(), CollectionError> {
        self.with_collection(id, |collection| {
            collection.requests.push(request);
            Ok(())
        })
    }

    /// Removes the request at `index` and returns it.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::IndexOutOfRange` if the index is past the
    /// end; the collection is unchanged in that case.
    pub fn remove_request(&self, id: &str, index: usize) -> Result<SavedRequest, CollectionError> {
        let mut removed = None;
        self.with_collection(id, |collection| {
            let len = collection.requests.len();
            if index >= len {
                return Err(CollectionError::IndexOutOfRange { index, len });
            }
            removed = Some(collection.requests.remove(index));
            Ok(())
        })?;

        removed.ok_or_else(|| CollectionError::NotFound(id.to_string()))
    }

    /// Flips the expanded flag and returns the new value.
    pub fn toggle_expanded(&self, id: &str) -> Result<bool, CollectionError> {
        let mut expanded = false;
        self.with_collection(id, |collection| {
            collection.expanded = !collection.expanded;
            expanded = collection.expanded;
            Ok(())
        })?;
        Ok(expanded)
    }

    fn with_collection<F>(&self, id: &str, f: F) -> Result<(), CollectionError>
    where
        F: FnOnce(&mut Collection) -> Result<(), CollectionError>,
    {
        self.modify(|list| {
            let collection = list
                .iter_mut()
                .find(|collection| collection.id == id)
                .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;
            f(collection)
        })
    }

    fn modify<F>(&self, f: F) -> Result<(), CollectionError>
    where
        F: FnOnce(&mut Vec<Collection>) -> Result<(), CollectionError>,
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| CollectionError::Lock(e.to_string()))?;

        let mut list = load_list(self.store.as_ref(), COLLECTIONS_KEY)?;
        f(&mut list)?;
        self.store.save(COLLECTIONS_KEY, &list)?;
        Ok(())
    }
}

fn load_list<T>(store: &dyn KeyValueStore, key: &str) -> Result<Vec<T>, CollectionError>
where
    T: serde::de::DeserializeOwned,
{
    Ok(store.load::<Vec<T>>(key)?.unwrap_or_default())
}
