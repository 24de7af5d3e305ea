//! Request cancellation.
//!
//! A [`CancelHandle`] is created per dispatch. Calling [`CancelHandle::cancel`]
//! wakes the dispatch, which drops its in-flight HTTP call (closing the
//! connection) and resolves to an `Aborted` failure. Cancelling twice, or after
//! the dispatch has completed, does nothing.
//!
//! [`RequestTracker`] keeps the handles of in-flight dispatches so that a caller
//! can cancel one by id or all of them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use uuid::Uuid;

const CANCELLED: u8 = 0b01;
const COMPLETED: u8 = 0b10;

/// Both flags live in one word so `cancel` and `mark_completed` cannot
/// interleave between a check and a set.
#[derive(Debug, Default)]
struct CancelState {
    flags: AtomicU8,
    notify: Notify,
}

/// A handle to an in-flight dispatch that can be cancelled.
///
/// Cloning is cheap; all clones control the same dispatch.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    request_id: String,
    state: Arc<CancelState>,
}

impl CancelHandle {
    /// Creates a new handle with a generated UUID.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Creates a new handle with a specific request ID.
    pub fn with_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            state: Arc::new(CancelState::default()),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Requests cancellation.
    ///
    /// # Returns
    ///
    /// `true` if this call cancelled the dispatch, `false` if it was already
    /// cancelled or had already completed.
    pub fn cancel(&self) -> bool {
        let changed = self
            .state
            .flags
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |flags| {
                (flags == 0).then_some(CANCELLED)
            })
            .is_ok();
        if changed {
            self.state.notify.notify_waiters();
        }
        changed
    }

    /// Checks if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.state.flags.load(Ordering::SeqCst) & CANCELLED != 0
    }

    /// Checks if the dispatch has finished.
    pub fn is_completed(&self) -> bool {
        self.state.flags.load(Ordering::SeqCst) & COMPLETED != 0
    }

    /// Marks the dispatch as finished; later `cancel` calls become no-ops.
    pub(crate) fn mark_completed(&self) {
        self.state.flags.fetch_or(COMPLETED, Ordering::SeqCst);
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        let notified = self.state.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent cancel is not missed
        notified.as_mut().enable();

        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Error types for cancellation operations.
#[derive(Debug, Clone, PartialEq)]
pub enum CancelError {
    /// Request with the given ID was not found.
    NotFound(String),

    /// Request has already completed and cannot be cancelled.
    AlreadyCompleted(String),

    /// Failed to acquire lock on tracker.
    LockError(String),
}

impl std::fmt::Display for CancelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelError::NotFound(id) => {
                write!(f, "Request not found: {}", id)
            }
            CancelError::AlreadyCompleted(id) => {
                write!(f, "Request already completed: {}", id)
            }
            CancelError::LockError(msg) => {
                write!(f, "Lock error: {}", msg)
            }
        }
    }
}

impl std::error::Error for CancelError {}

/// Tracks in-flight dispatches and manages cancellation.
#[derive(Debug, Default)]
pub struct RequestTracker {
    /// Map of request IDs to their handles.
    active_requests: HashMap<String, CancelHandle>,

    /// Order of request IDs by registration time (oldest first).
    request_order: Vec<String>,
}

impl RequestTracker {
    /// Creates a new empty request tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handle for tracking and returns its request ID.
    pub fn register(&mut self, handle: CancelHandle) -> String {
        let request_id = handle.request_id().to_string();
        self.request_order.push(request_id.clone());
        self.active_requests.insert(request_id.clone(), handle);
        request_id
    }

    /// Removes a request from tracking (called when the dispatch completes).
    ///
    /// # Returns
    ///
    /// `true` if the request was found and removed, `false` otherwise.
    pub fn unregister(&mut self, request_id: &str) -> bool {
        if let Some(pos) = self.request_order.iter().position(|id| id == request_id) {
            self.request_order.remove(pos);
        }
        self.active_requests.remove(request_id).is_some()
    }

    /// Cancels a specific request by ID.
    ///
    /// # Returns
    ///
    /// `Ok(())` if cancellation was requested, or `Err(CancelError)` if the
    /// request is unknown or already completed.
    pub fn cancel_request(&mut self, request_id: &str) -> Result<(), CancelError> {
        let handle = self
            .active_requests
            .get(request_id)
            .ok_or_else(|| CancelError::NotFound(request_id.to_string()))?;

        let cancelled = handle.cancel();
        let completed = handle.is_completed();
        self.unregister(request_id);

        if !cancelled && completed {
            Err(CancelError::AlreadyCompleted(request_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Cancels every tracked request and returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let count = self
            .active_requests
            .values()
            .filter(|handle| handle.cancel())
            .count();
        self.active_requests.clear();
        self.request_order.clear();
        count
    }

    /// Gets all tracked request IDs, oldest first.
    pub fn active_request_ids(&self) -> Vec<String> {
        self.request_order.clone()
    }
}

/// Thread-safe wrapper around RequestTracker.
#[derive(Debug, Clone, Default)]
pub struct SharedRequestTracker {
    inner: Arc<Mutex<RequestTracker>>,
}

impl SharedRequestTracker {
    /// Creates a new shared request tracker.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, RequestTracker>, CancelError> {
        self.inner
            .lock()
            .map_err(|e| CancelError::LockError(e.to_string()))
    }

    /// Registers a handle for tracking.
    pub fn register(&self, handle: CancelHandle) -> Result<String, CancelError> {
        Ok(self.lock()?.register(handle))
    }

    /// Removes a request from tracking.
    pub fn unregister(&self, request_id: &str) -> Result<bool, CancelError> {
        Ok(self.lock()?.unregister(request_id))
    }

    /// Cancels a specific request.
    pub fn cancel_request(&self, request_id: &str) -> Result<(), CancelError> {
        self.lock()?.cancel_request(request_id)
    }

    /// Cancels every tracked request.
    pub fn cancel_all(&self) -> Result<usize, CancelError> {
        Ok(self.lock()?.cancel_all())
    }

    /// Gets all tracked request IDs.
    pub fn active_request_ids(&self) -> Result<Vec<String>, CancelError> {
        Ok(self.lock()?.active_request_ids())
    }
}
