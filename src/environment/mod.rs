//! Environment management module
//!
//! Environments are named sets of variables used to fill `{{name}}` placeholders.
//! Users create, rename and delete environments, edit their variables, and pick at
//! most one as active. The [`EnvironmentManager`] keeps that state behind a lock
//! and writes every change through to a [`KeyValueStore`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use apicraft::environment::EnvironmentManager;
//! use apicraft::storage::MemoryStore;
//!
//! let manager = EnvironmentManager::load(Arc::new(MemoryStore::new())).unwrap();
//! let dev = manager.create_environment("dev").unwrap();
//! manager.set_variable(&dev, "baseUrl", "http://localhost:8080").unwrap();
//! manager.set_active(&dev).unwrap();
//!
//! let bindings = manager.active_bindings();
//! assert_eq!(bindings.get("baseUrl").map(String::as_str), Some("http://localhost:8080"));
//! ```

pub mod loader;
pub mod models;

use crate::storage::KeyValueStore;
use crate::variables::Bindings;
use std::sync::{Arc, RwLock};

// Re-export public types for convenience
pub use loader::{load_environments, save_environments, EnvError};
pub use models::{Environment, Environments, Variable};

/// Shared, persisted environment state
///
/// Cloning is cheap; clones share the same state and store. Every mutating call
/// persists the whole environment list before returning.
#[derive(Clone)]
pub struct EnvironmentManager {
    environments: Arc<RwLock<Environments>>,
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for EnvironmentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentManager")
            .field("environments", &self.environments)
            .finish_non_exhaustive()
    }
}

impl EnvironmentManager {
    /// Loads state from the store
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, EnvError> {
        let environments = load_environments(store.as_ref())?;
        Ok(Self {
            environments: Arc::new(RwLock::new(environments)),
            store,
        })
    }

    /// Snapshot of the active environment's variables
    ///
    /// Empty when no environment is active. The snapshot is detached: later edits
    /// do not affect a compile already in progress.
    pub fn active_bindings(&self) -> Bindings {
        self.environments
            .read()
            .map(|envs| envs.active_bindings())
            .unwrap_or_default()
    }

    /// Gets a clone of the active environment
    pub fn active_environment(&self) -> Option<Environment> {
        self.environments
            .read()
            .ok()
            .and_then(|envs| envs.active().cloned())
    }

    /// Gets a clone of an environment by id
    pub fn get(&self, id: &str) -> Option<Environment> {
        self.environments
            .read()
            .ok()
            .and_then(|envs| envs.get(id).cloned())
    }

    /// Gets a clone of the first environment with the given name
    pub fn find_by_name(&self, name: &str) -> Option<Environment> {
        self.environments
            .read()
            .ok()
            .and_then(|envs| envs.find_by_name(name).cloned())
    }

    /// Clones of all environments in creation order
    pub fn list(&self) -> Vec<Environment> {
        self.environments
            .read()
            .map(|envs| envs.list().to_vec())
            .unwrap_or_default()
    }

    /// Creates an environment and returns its id
    pub fn create_environment(&self, name: &str) -> Result<String, EnvError> {
        self.update(|envs| envs.create(name))
    }

    /// Renames an environment
    pub fn rename_environment(&self, id: &str, name: &str) -> Result<(), EnvError> {
        self.update(|envs| envs.rename(id, name))
    }

    /// Deletes an environment, clearing the active pointer if it was active
    pub fn delete_environment(&self, id: &str) -> Result<Environment, EnvError> {
        self.update(|envs| envs.delete(id))
    }

    /// Makes an environment active by id
    pub fn set_active(&self, id: &str) -> Result<(), EnvError> {
        self.update(|envs| envs.set_active(id))
    }

    /// Makes the first environment with the given name active
    pub fn set_active_by_name(&self, name: &str) -> Result<(), EnvError> {
        self.update(|envs| {
            let id = envs
                .find_by_name(name)
                .map(|e| e.id.clone())
                .ok_or_else(|| EnvError::NotFound(name.to_string()))?;
            envs.set_active(&id)
        })
    }

    /// Leaves no environment active
    pub fn clear_active(&self) -> Result<(), EnvError> {
        self.update(|envs| {
            envs.clear_active();
            Ok(())
        })
    }

    /// Adds or updates a variable in an environment
    pub fn set_variable(&self, env_id: &str, key: &str, value: &str) -> Result<(), EnvError> {
        self.update(|envs| {
            envs.get_mut(env_id)?.set(key, value);
            Ok(())
        })
    }

    /// Removes a variable from an environment
    pub fn remove_variable(&self, env_id: &str, key: &str) -> Result<(), EnvError> {
        self.update(|envs| {
            envs.get_mut(env_id)?
                .remove(key)
                .map(|_| ())
                .ok_or_else(|| EnvError::VariableNotFound(key.to_string()))
        })
    }

    /// Renames a variable in an environment
    pub fn rename_variable(&self, env_id: &str, from: &str, to: &str) -> Result<(), EnvError> {
        self.update(|envs| envs.get_mut(env_id)?.rename_variable(from, to))
    }

    /// Re-reads state from the store, discarding in-memory state
    pub fn reload(&self) -> Result<(), EnvError> {
        let fresh = load_environments(self.store.as_ref())?;
        let mut envs = self
            .environments
            .write()
            .map_err(|e| EnvError::Lock(e.to_string()))?;
        *envs = fresh;
        Ok(())
    }

    /// Applies a mutation under the write lock and persists on success
    ///
    /// A failed mutation leaves both memory and store untouched.
    fn update<T>(
        &self,
        mutate: impl FnOnce(&mut Environments) -> Result<T, EnvError>,
    ) -> Result<T, EnvError> {
        let mut envs = self
            .environments
            .write()
            .map_err(|e| EnvError::Lock(e.to_string()))?;

        let mut draft = envs.clone();
        let result = mutate(&mut draft)?;
        save_environments(self.store.as_ref(), &draft)?;
        *envs = draft;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::thread;

    fn manager() -> (EnvironmentManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let manager = EnvironmentManager::load(store.clone()).unwrap();
        (manager, store)
    }

    #[test]
    fn test_manager_persists_changes() {
        let (manager, store) = manager();
        let dev = manager.create_environment("dev").unwrap();
        manager.set_variable(&dev, "host", "localhost").unwrap();
        manager.set_active(&dev).unwrap();

        let reopened = EnvironmentManager::load(store).unwrap();
        assert_eq!(reopened.active_environment().unwrap().name, "dev");
        assert_eq!(
            reopened.active_bindings().get("host").map(String::as_str),
            Some("localhost")
        );
    }

    #[test]
    fn test_no_active_environment_gives_empty_bindings() {
        let (manager, _) = manager();
        manager.create_environment("dev").unwrap();
        assert!(manager.active_bindings().is_empty());
        assert!(manager.active_environment().is_none());
    }

    #[test]
    fn test_delete_active_environment() {
        let (manager, store) = manager();
        let dev = manager.create_environment("dev").unwrap();
        manager.set_active(&dev).unwrap();

        manager.delete_environment(&dev).unwrap();
        assert!(manager.active_environment().is_none());

        let reopened = EnvironmentManager::load(store).unwrap();
        assert!(reopened.list().is_empty());
        assert!(reopened.active_environment().is_none());
    }

    #[test]
    fn test_set_active_by_name() {
        let (manager, _) = manager();
        manager.create_environment("dev").unwrap();
        manager.set_active_by_name("dev").unwrap();
        assert_eq!(manager.active_environment().unwrap().name, "dev");

        assert!(matches!(
            manager.set_active_by_name("prod"),
            Err(EnvError::NotFound(_))
        ));
    }

    #[test]
    fn test_variable_editing() {
        let (manager, _) = manager();
        let dev = manager.create_environment("dev").unwrap();
        manager.set_variable(&dev, "a", "1").unwrap();
        manager.rename_variable(&dev, "a", "b").unwrap();
        assert_eq!(manager.get(&dev).unwrap().get("b"), Some("1"));

        manager.remove_variable(&dev, "b").unwrap();
        assert!(manager.get(&dev).unwrap().is_empty());
        assert!(matches!(
            manager.remove_variable(&dev, "b"),
            Err(EnvError::VariableNotFound(_))
        ));
    }

    #[test]
    fn test_failed_update_changes_nothing() {
        let (manager, _) = manager();
        let dev = manager.create_environment("dev").unwrap();
        manager.set_variable(&dev, "a", "1").unwrap();
        manager.set_variable(&dev, "b", "2").unwrap();

        assert!(manager.rename_variable(&dev, "a", "b").is_err());
        let env = manager.get(&dev).unwrap();
        assert_eq!(env.get("a"), Some("1"));
        assert_eq!(env.get("b"), Some("2"));
    }

    #[test]
    fn test_bindings_snapshot_is_detached() {
        let (manager, _) = manager();
        let dev = manager.create_environment("dev").unwrap();
        manager.set_variable(&dev, "host", "one").unwrap();
        manager.set_active(&dev).unwrap();

        let snapshot = manager.active_bindings();
        manager.set_variable(&dev, "host", "two").unwrap();

        assert_eq!(snapshot.get("host").map(String::as_str), Some("one"));
    }

    #[test]
    fn test_reload_picks_up_external_changes() {
        let (manager, store) = manager();
        let other = EnvironmentManager::load(store).unwrap();
        other.create_environment("external").unwrap();

        assert!(manager.list().is_empty());
        manager.reload().unwrap();
        assert_eq!(manager.list().len(), 1);
    }

    #[test]
    fn test_manager_thread_safety() {
        let (manager, _) = manager();
        let dev = manager.create_environment("dev").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let manager = manager.clone();
                let dev = dev.clone();
                thread::spawn(move || {
                    manager
                        .set_variable(&dev, &format!("var{}", i), &i.to_string())
                        .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(manager.get(&dev).unwrap().len(), 8);
    }
}
