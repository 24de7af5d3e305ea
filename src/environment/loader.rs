//! Loading and saving environments through a key-value store.
//!
//! The environment list lives under [`ENVIRONMENTS_KEY`] and the id of the active
//! environment under [`CURRENT_ENV_KEY`], so the pointer can change without
//! rewriting every environment.

use super::models::{Environment, Environments};
use crate::storage::{KeyValueStore, StorageError, StoreExt, CURRENT_ENV_KEY, ENVIRONMENTS_KEY};

/// Errors that can occur when managing environments
#[derive(Debug)]
pub enum EnvError {
    /// No environment has the given id or name
    NotFound(String),

    /// Environment names must not be blank
    InvalidName(String),

    /// A variable with this key already exists in the environment
    DuplicateVariable(String),

    /// The environment has no variable with this key
    VariableNotFound(String),

    /// The backing store failed
    Storage(StorageError),

    /// The shared state lock was poisoned
    Lock(String),
}

impl std::fmt::Display for EnvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvError::NotFound(id) => write!(f, "Environment '{}' not found", id),
            EnvError::InvalidName(name) => {
                write!(f, "Invalid environment name: '{}'. Names must not be blank", name)
            }
            EnvError::DuplicateVariable(key) => write!(f, "Variable '{}' already exists", key),
            EnvError::VariableNotFound(key) => write!(f, "Variable '{}' not found", key),
            EnvError::Storage(err) => write!(f, "Failed to persist environments: {}", err),
            EnvError::Lock(msg) => write!(f, "Environment lock error: {}", msg),
        }
    }
}

impl std::error::Error for EnvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnvError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for EnvError {
    fn from(err: StorageError) -> Self {
        EnvError::Storage(err)
    }
}

/// Loads environments and the active pointer from the store
///
/// Missing keys yield an empty collection with nothing active.
///
/// # Returns
///
/// * `Ok(Environments)` - The stored environments
/// * `Err(EnvError)` - If the store could not be read
pub fn load_environments(store: &dyn KeyValueStore) -> Result<Environments, EnvError> {
    let environments: Vec<Environment> = store.load(ENVIRONMENTS_KEY)?.unwrap_or_default();
    let active: Option<String> = store.load(CURRENT_ENV_KEY)?;

    log::debug!(
        "Loaded {} environment(s), active: {:?}",
        environments.len(),
        active
    );

    Ok(Environments::from_parts(environments, active))
}

/// Saves environments and the active pointer to the store
///
/// When nothing is active the pointer key is deleted.
pub fn save_environments(
    store: &dyn KeyValueStore,
    environments: &Environments,
) -> Result<(), EnvError> {
    store.save(ENVIRONMENTS_KEY, environments.list())?;
    match environments.active_id() {
        Some(id) => store.save(CURRENT_ENV_KEY, id)?,
        None => store.delete(CURRENT_ENV_KEY)?,
    }
    Ok(())
}
