//! Environment data models
//!
//! An environment is a named, user-edited set of variables. At most one environment
//! is active at a time; its variables are the bindings used to resolve `{{name}}`
//! placeholders when a request is compiled.

use super::loader::EnvError;
use crate::variables::Bindings;
use serde::{Deserialize, Serialize};

/// One variable row of an environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variable {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Represents a single environment with its variables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Environment {
    /// Stable identifier; the active pointer refers to this
    pub id: String,

    /// Display name (e.g., "dev", "staging", "production")
    pub name: String,

    /// Variables in the order the user added them
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl Environment {
    /// Creates a new empty environment with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            variables: Vec::new(),
        }
    }

    /// Gets a variable value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|v| v.key == key)
            .map(|v| v.value.as_str())
    }

    /// Sets a variable, updating it in place when the key already exists
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.variables.iter_mut().find(|v| v.key == key) {
            Some(existing) => existing.value = value,
            None => self.variables.push(Variable { key, value }),
        }
    }

    /// Removes a variable, returning its value if it existed
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.variables.iter().position(|v| v.key == key)?;
        Some(self.variables.remove(index).value)
    }

    /// Renames a variable, keeping its value and position
    ///
    /// # Errors
    ///
    /// `EnvError::VariableNotFound` if `from` does not exist,
    /// `EnvError::DuplicateVariable` if `to` is already taken by another variable.
    pub fn rename_variable(&mut self, from: &str, to: &str) -> Result<(), EnvError> {
        if from == to {
            return if self.contains(from) {
                Ok(())
            } else {
                Err(EnvError::VariableNotFound(from.to_string()))
            };
        }
        if self.contains(to) {
            return Err(EnvError::DuplicateVariable(to.to_string()));
        }

        let variable = self
            .variables
            .iter_mut()
            .find(|v| v.key == from)
            .ok_or_else(|| EnvError::VariableNotFound(from.to_string()))?;
        variable.key = to.to_string();
        Ok(())
    }

    /// Checks if a variable exists
    pub fn contains(&self, key: &str) -> bool {
        self.variables.iter().any(|v| v.key == key)
    }

    /// Returns the number of variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Checks if the environment has no variables
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Snapshot of the variables as resolver bindings
    ///
    /// Rows with a blank key are skipped.
    pub fn bindings(&self) -> Bindings {
        self.variables
            .iter()
            .filter(|v| !v.key.trim().is_empty())
            .map(|v| (v.key.clone(), v.value.clone()))
            .collect()
    }
}

/// All environments plus the active pointer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environments {
    environments: Vec<Environment>,
    active: Option<String>,
}

impl Environments {
    /// Creates a new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from stored parts
    ///
    /// An active id that does not match any environment is dropped.
    pub fn from_parts(environments: Vec<Environment>, active: Option<String>) -> Self {
        let active = active.filter(|id| environments.iter().any(|e| &e.id == id));
        Self {
            environments,
            active,
        }
    }

    /// Creates an environment and returns its id
    ///
    /// # Errors
    ///
    /// `EnvError::InvalidName` if the name is blank.
    pub fn create(&mut self, name: &str) -> Result<String, EnvError> {
        let name = validate_name(name)?;
        let env = Environment::new(name);
        let id = env.id.clone();
        self.environments.push(env);
        Ok(id)
    }

    /// Adds an already-built environment, replacing one with the same id
    pub fn insert(&mut self, env: Environment) {
        match self.environments.iter_mut().find(|e| e.id == env.id) {
            Some(existing) => *existing = env,
            None => self.environments.push(env),
        }
    }

    /// Renames an environment
    pub fn rename(&mut self, id: &str, name: &str) -> Result<(), EnvError> {
        let name = validate_name(name)?;
        let env = self.get_mut(id)?;
        env.name = name.to_string();
        Ok(())
    }

    /// Deletes an environment; deleting the active one clears the active pointer
    pub fn delete(&mut self, id: &str) -> Result<Environment, EnvError> {
        let index = self
            .environments
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| EnvError::NotFound(id.to_string()))?;

        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        Ok(self.environments.remove(index))
    }

    /// Gets an environment by id
    pub fn get(&self, id: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.id == id)
    }

    /// Gets an environment by id for editing
    pub fn get_mut(&mut self, id: &str) -> Result<&mut Environment, EnvError> {
        self.environments
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| EnvError::NotFound(id.to_string()))
    }

    /// Gets the first environment with the given name
    pub fn find_by_name(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name == name)
    }

    /// Makes the environment with `id` active
    pub fn set_active(&mut self, id: &str) -> Result<(), EnvError> {
        if self.get(id).is_none() {
            return Err(EnvError::NotFound(id.to_string()));
        }
        self.active = Some(id.to_string());
        Ok(())
    }

    /// Leaves no environment active
    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Id of the active environment
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Gets the currently active environment
    pub fn active(&self) -> Option<&Environment> {
        self.active.as_deref().and_then(|id| self.get(id))
    }

    /// Bindings of the active environment; empty when none is active
    pub fn active_bindings(&self) -> Bindings {
        self.active().map(Environment::bindings).unwrap_or_default()
    }

    /// All environments in creation order
    pub fn list(&self) -> &[Environment] {
        &self.environments
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }
}

fn validate_name(name: &str) -> Result<&str, EnvError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EnvError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}
