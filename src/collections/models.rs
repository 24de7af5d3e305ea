//! Data models for saved requests and collections.

use crate::models::RequestDescription;
use crate::storage::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A request description stored under a user-chosen name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRequest {
    pub id: String,
    pub name: String,

    /// The request exactly as authored, placeholders unresolved.
    pub config: RequestDescription,

    pub saved_at: DateTime<Utc>,
}

impl SavedRequest {
    /// Creates a saved request stamped now.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::InvalidName` if the name is blank.
    pub fn new(
        name: impl Into<String>,
        config: RequestDescription,
    ) -> Result<Self, CollectionError> {
        let name = validated_name(name.into())?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            config,
            saved_at: Utc::now(),
        })
    }
}

/// A named, ordered group of saved requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub requests: Vec<SavedRequest>,

    /// Whether the collection is shown expanded in a listing.
    #[serde(default)]
    pub expanded: bool,
}

impl Collection {
    /// Creates an empty, expanded collection.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::InvalidName` if the name is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, CollectionError> {
        let name = validated_name(name.into())?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            requests: Vec::new(),
            expanded: true,
        })
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

fn validated_name(name: String) -> Result<String, CollectionError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CollectionError::InvalidName(name));
    }
    Ok(trimmed.to_string())
}

/// Errors that can occur when managing saved requests and collections.
#[derive(Debug)]
pub enum CollectionError {
    /// No saved request or collection with this id.
    NotFound(String),

    /// Names must contain at least one non-whitespace character.
    InvalidName(String),

    /// A request index past the end of a collection.
    IndexOutOfRange { index: usize, len: usize },

    /// The backing store failed.
    Storage(StorageError),

    /// A lock was poisoned.
    Lock(String),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::NotFound(id) => write!(f, "Not found: {}", id),
            CollectionError::InvalidName(name) => write!(f, "Invalid name: '{}'", name),
            CollectionError::IndexOutOfRange { index, len } => write!(
                f,
                "Request index {} out of range for collection of {}",
                index, len
            ),
            CollectionError::Storage(err) => write!(f, "Collection storage error: {}", err),
            CollectionError::Lock(msg) => write!(f, "Collection lock error: {}", msg),
        }
    }
}

impl std::error::Error for CollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectionError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for CollectionError {
    fn from(err: StorageError) -> Self {
        CollectionError::Storage(err)
    }
}
