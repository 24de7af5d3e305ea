//! Data models for request history.

use crate::auth::is_sensitive_header;
use crate::models::{CompiledRequest, FailureKind, HttpMethod, ResponseOutcome};
use crate::storage::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum response body size to keep in history (1MB).
///
/// Larger responses are recorded without their payload.
pub const MAX_RESPONSE_BODY_SIZE: usize = 1_048_576;

/// A single completed dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub method: HttpMethod,

    /// The compiled URL that was actually requested.
    pub url: String,

    /// HTTP status; absent when the dispatch failed before a response arrived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Failure class for dispatches that produced no response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,

    pub elapsed_ms: u64,

    /// Completion time, UTC.
    pub timestamp: DateTime<Utc>,

    /// Full outcome, when the log is configured to keep it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseOutcome>,
}

impl HistoryEntry {
    /// Creates an entry for a finished dispatch, stamped now.
    ///
    /// # Arguments
    ///
    /// * `request` - The request that was dispatched
    /// * `outcome` - What came back
    /// * `keep_response` - Whether to store the full outcome in the entry
    pub fn from_outcome(
        request: &CompiledRequest,
        outcome: &ResponseOutcome,
        keep_response: bool,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            method: request.method,
            url: request.url.clone(),
            status: outcome.status(),
            failure: outcome.failure_kind(),
            elapsed_ms: outcome.elapsed_ms(),
            timestamp: Utc::now(),
            response: keep_response.then(|| outcome.clone()),
        }
    }

    /// Whether the dispatch failed at the transport level.
    pub fn is_failure(&self) -> bool {
        self.status.is_none()
    }

    /// Whether a 2xx response was received.
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(200..=299))
    }

    /// Whether the stored payload exceeds [`MAX_RESPONSE_BODY_SIZE`].
    pub fn has_large_response(&self) -> bool {
        match &self.response {
            Some(ResponseOutcome::Success(data)) => data.size > MAX_RESPONSE_BODY_SIZE,
            _ => false,
        }
    }

    /// Returns a copy without credential-bearing response headers.
    pub fn sanitize_headers(&self) -> Self {
        let mut sanitized = self.clone();
        if let Some(ResponseOutcome::Success(data)) = &mut sanitized.response {
            data.headers.retain(|name, _| !is_sensitive_header(name));
        }
        sanitized
    }

    /// Returns a copy without the stored outcome if it is too large.
    pub fn truncate_large_response(&self) -> Self {
        let mut truncated = self.clone();
        if self.has_large_response() {
            truncated.response = None;
        }
        truncated
    }

    /// Prepares the entry for storage by sanitizing and truncating as needed.
    pub fn prepare_for_storage(&self, sanitize_sensitive: bool) -> Self {
        let entry = if sanitize_sensitive {
            self.sanitize_headers()
        } else {
            self.clone()
        };
        entry.truncate_large_response()
    }
}

/// Errors that can occur during history operations.
#[derive(Debug)]
pub enum HistoryError {
    /// The backing store failed.
    StorageError(StorageError),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::StorageError(err) => write!(f, "History storage error: {}", err),
        }
    }
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HistoryError::StorageError(err) => Some(err),
        }
    }
}

impl From<StorageError> for HistoryError {
    fn from(err: StorageError) -> Self {
        HistoryError::StorageError(err)
    }
}
