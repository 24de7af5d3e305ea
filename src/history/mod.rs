//! Request history tracking and persistence.
//!
//! Every completed dispatch, success or failure, is recorded as a
//! [`HistoryEntry`] at the head of a bounded [`HistoryLog`]. Once the bound is
//! reached the oldest entries are evicted.
//!
//! # Features
//!
//! - Newest-first ordering by completion time
//! - Automatic history limit enforcement
//! - Sensitive header sanitization
//! - Search and filtering by URL, method, status and failure
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use apicraft::history::{HistoryConfig, HistoryLog};
//! use apicraft::storage::MemoryStore;
//!
//! let log = HistoryLog::new(Arc::new(MemoryStore::new()), HistoryConfig::with_limit(50));
//! assert!(log.entries().unwrap().is_empty());
//! ```

pub mod models;
pub mod search;
pub mod storage;

// Re-export commonly used types
pub use models::{HistoryEntry, HistoryError, MAX_RESPONSE_BODY_SIZE};
pub use search::{
    filter_by_failure_kind, filter_by_method, filter_by_status, filter_errors, filter_failures,
    filter_successful, search_history, sort_by_timestamp_desc,
};
pub use storage::{HistoryConfig, HistoryLog};
