//! High-level client tying the request pipeline together.
//!
//! A send takes a snapshot of the active environment's bindings, compiles the
//! description, dispatches it, and records the outcome in history. Sends never
//! fail: transport problems come back as [`ResponseOutcome::Failure`], and a
//! history that cannot be written is logged and skipped.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use apicraft::client::ApiClient;
//! use apicraft::models::{HttpMethod, RequestDescription};
//! use apicraft::storage::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::open(Arc::new(MemoryStore::new()))?;
//! let outcome = client
//!     .send(&RequestDescription::new(HttpMethod::GET, "https://httpbin.org/get"))
//!     .await;
//! println!("{:?}", outcome.status());
//! # Ok(())
//! # }
//! ```

use crate::compiler::compile;
use crate::config::get_config;
use crate::environment::{EnvError, EnvironmentManager};
use crate::executor::{CancelHandle, Dispatcher, InFlight, RequestError, SharedRequestTracker};
use crate::export::{export, ExportFormat};
use crate::history::{HistoryConfig, HistoryEntry, HistoryLog};
use crate::models::{CompiledRequest, RequestDescription, ResponseOutcome, DEFAULT_TIMEOUT_MS};
use crate::storage::{KeyValueStore, RECENT_KEY};
use std::fmt;
use std::sync::Arc;

/// Errors that can occur while assembling a client.
#[derive(Debug)]
pub enum ClientError {
    /// The HTTP transport could not be created.
    Dispatcher(RequestError),

    /// Stored environments could not be loaded.
    Environment(EnvError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Dispatcher(err) => write!(f, "Failed to create dispatcher: {}", err),
            ClientError::Environment(err) => write!(f, "Failed to load environments: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Dispatcher(err) => Some(err),
            ClientError::Environment(err) => Some(err),
        }
    }
}

impl From<RequestError> for ClientError {
    fn from(err: RequestError) -> Self {
        ClientError::Dispatcher(err)
    }
}

impl From<EnvError> for ClientError {
    fn from(err: EnvError) -> Self {
        ClientError::Environment(err)
    }
}

/// Compiles, dispatches and records requests.
///
/// Cloning is cheap; clones share the transport, environments, history and the
/// set of in-flight requests.
#[derive(Debug, Clone)]
pub struct ApiClient {
    dispatcher: Dispatcher,
    environments: EnvironmentManager,
    history: Arc<HistoryLog>,
    recent: Option<Arc<HistoryLog>>,
    tracker: SharedRequestTracker,
    default_timeout_ms: u64,
}

impl ApiClient {
    /// Assembles a client from its parts, with no recent-requests list.
    pub fn new(
        dispatcher: Dispatcher,
        environments: EnvironmentManager,
        history: Arc<HistoryLog>,
    ) -> Self {
        Self {
            dispatcher,
            environments,
            history,
            recent: None,
            tracker: SharedRequestTracker::new(),
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Timeout used for descriptions whose `timeoutMs` is 0.
    pub fn with_default_timeout_ms(mut self, timeout_ms: u64) -> Self {
        if timeout_ms > 0 {
            self.default_timeout_ms = timeout_ms;
        }
        self
    }

    /// Also records every dispatch in a second, summary-only log.
    pub fn with_recent(mut self, recent: Arc<HistoryLog>) -> Self {
        self.recent = Some(recent);
        self
    }

    /// Builds a client over `store` using the global configuration.
    ///
    /// The main history is bounded by `historyLimit` and keeps responses; the
    /// recent list is bounded by `recentHistoryLimit` and keeps summaries.
    /// Descriptions with no timeout of their own use `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the HTTP client cannot be created or stored
    /// environments cannot be read.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Result<Self, ClientError> {
        let dispatcher = Dispatcher::from_global_config()?;
        let environments = EnvironmentManager::load(store.clone())?;
        let history = Arc::new(HistoryLog::new(
            store.clone(),
            HistoryConfig::from_global_config(),
        ));
        let recent = Arc::new(HistoryLog::with_key(
            store,
            RECENT_KEY,
            HistoryConfig::recent_from_global_config(),
        ));

        Ok(Self::new(dispatcher, environments, history)
            .with_recent(recent)
            .with_default_timeout_ms(get_config().timeout))
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn environments(&self) -> &EnvironmentManager {
        &self.environments
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn recent(&self) -> Option<&HistoryLog> {
        self.recent.as_deref()
    }

    /// Compiles a description against the active environment as it is now.
    pub fn compile(&self, description: &RequestDescription) -> CompiledRequest {
        compile(description, &self.environments.active_bindings())
    }

    /// Compiles a description and renders it in an export format.
    pub fn export(&self, description: &RequestDescription, format: ExportFormat) -> String {
        export(&self.compile(description), format)
    }

    /// Sends a request and waits for its outcome.
    ///
    /// Bindings are captured once, before compiling; environment edits made
    /// while the request is in flight do not affect it.
    ///
    /// Dropping the returned future cancels the request. The dispatch still
    /// resolves in the background as `Aborted`, leaves the in-flight set and
    /// is recorded in history.
    ///
    /// # Panics
    ///
    /// Panics if polled outside a tokio runtime.
    pub async fn send(&self, description: &RequestDescription) -> ResponseOutcome {
        let in_flight = self.start(description);
        let _guard = CancelOnDrop(in_flight.cancel_handle());
        in_flight.outcome().await
    }

    /// Starts a request in the background.
    ///
    /// The returned [`InFlight`] can be cancelled or awaited. History is
    /// recorded when the dispatch completes, whether or not anyone awaits it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(&self, description: &RequestDescription) -> InFlight {
        let request = self.compile(description);
        let timeout_ms = self.timeout_for(description);
        let cancel = CancelHandle::new();
        self.track(&cancel);

        let client = self.clone();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            let outcome = client
                .dispatcher
                .dispatch_with_cancel(&request, timeout_ms, &task_cancel)
                .await;
            client.finish(&task_cancel, &request, &outcome);
            outcome
        });

        InFlight::from_parts(cancel, task)
    }

    /// Cancels one in-flight request by id.
    ///
    /// # Returns
    ///
    /// `true` if a running request was cancelled.
    pub fn cancel(&self, request_id: &str) -> bool {
        match self.tracker.cancel_request(request_id) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("Cancel of {} ignored: {}", request_id, err);
                false
            }
        }
    }

    /// Cancels every in-flight request and returns how many were signalled.
    pub fn cancel_all(&self) -> usize {
        self.tracker.cancel_all().unwrap_or_else(|err| {
            log::warn!("Failed to cancel in-flight requests: {}", err);
            0
        })
    }

    /// Ids of requests still in flight.
    pub fn in_flight(&self) -> Vec<String> {
        self.tracker.active_request_ids().unwrap_or_default()
    }

    fn timeout_for(&self, description: &RequestDescription) -> u64 {
        if description.timeout_ms == 0 {
            self.default_timeout_ms
        } else {
            description.timeout_ms
        }
    }

    fn track(&self, cancel: &CancelHandle) {
        if let Err(err) = self.tracker.register(cancel.clone()) {
            log::warn!("Failed to track request {}: {}", cancel.request_id(), err);
        }
    }

    fn finish(&self, cancel: &CancelHandle, request: &CompiledRequest, outcome: &ResponseOutcome) {
        if let Err(err) = self.tracker.unregister(cancel.request_id()) {
            log::warn!("Failed to untrack request {}: {}", cancel.request_id(), err);
        }

        let entry = HistoryEntry::from_outcome(request, outcome, true);
        if let Some(recent) = &self.recent {
            if let Err(err) = recent.record(entry.clone()) {
                log::error!("Failed to record recent request: {}", err);
            }
        }
        if let Err(err) = self.history.record(entry) {
            log::error!("Failed to record history: {}", err);
        }
    }
}

/// Cancels a dispatch when dropped; a no-op once it has completed.
struct CancelOnDrop(CancelHandle);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.0.cancel() {
            log::debug!("Request {} cancelled: caller went away", self.0.request_id());
        }
    }
}
