//! HTTP dispatcher.
//!
//! Sends a [`CompiledRequest`] over the network and normalizes whatever happens
//! into a single [`ResponseOutcome`]:
//!
//! - any HTTP response, 1xx through 5xx, is a `Success`;
//! - a DNS failure, refused or dropped connection, or unusable URL is a
//!   `Failure` of kind `Network`;
//! - no complete response within the timeout is a `Failure` of kind `Timeout`;
//! - an explicit [`CancelHandle::cancel`] is a `Failure` of kind `Aborted`.
//!
//! The timeout covers sending the request and reading the whole body. When it
//! fires, or the request is cancelled, the in-flight call is dropped, which
//! closes its connection. Nothing is retried.

pub mod cancellation;
pub mod config;
pub mod error;

pub use cancellation::{CancelError, CancelHandle, RequestTracker, SharedRequestTracker};
pub use config::DispatchConfig;
pub use error::RequestError;

use crate::models::{
    CompiledRequest, HttpMethod, ResponseBody, ResponseData, ResponseFailure, ResponseFormat,
    ResponseOutcome, DEFAULT_TIMEOUT_MS,
};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Status line, headers and body as read off the wire.
struct RawResponse {
    status: u16,
    status_text: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

/// Executes compiled requests.
///
/// Cloning is cheap and clones share the connection pool. Dispatches are
/// independent; any number may be in flight at once.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Creates a dispatcher with the given transport settings.
    ///
    /// # Errors
    ///
    /// Returns `RequestError::BuildError` if the HTTP client cannot be created
    /// (e.g. the TLS backend fails to initialize).
    pub fn new(config: DispatchConfig) -> Result<Self, RequestError> {
        let client = reqwest::Client::builder()
            .redirect(config.redirect_policy())
            .danger_accept_invalid_certs(!config.validate_ssl)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RequestError::BuildError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Creates a dispatcher from the global configuration.
    pub fn from_global_config() -> Result<Self, RequestError> {
        Self::new(DispatchConfig::from_global_config())
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Dispatches a request with no way to cancel it.
    ///
    /// A `timeout_ms` of 0 uses the 30 second default.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use apicraft::compiler::compile_without_environment;
    /// use apicraft::executor::{DispatchConfig, Dispatcher};
    /// use apicraft::models::{HttpMethod, RequestDescription};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let dispatcher = Dispatcher::new(DispatchConfig::default())?;
    /// let request = compile_without_environment(
    ///     &RequestDescription::new(HttpMethod::GET, "https://httpbin.org/get"),
    /// );
    ///
    /// let outcome = dispatcher.dispatch(&request, 5_000).await;
    /// println!("{:?} in {}ms", outcome.status(), outcome.elapsed_ms());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn dispatch(&self, request: &CompiledRequest, timeout_ms: u64) -> ResponseOutcome {
        self.dispatch_with_cancel(request, timeout_ms, &CancelHandle::new())
            .await
    }

    /// Dispatches a request that can be cancelled through `cancel`.
    ///
    /// Resolves on exactly one of: a complete response, the timeout, or
    /// cancellation. The handle is marked completed before returning, so a late
    /// `cancel` is a no-op.
    pub async fn dispatch_with_cancel(
        &self,
        request: &CompiledRequest,
        timeout_ms: u64,
        cancel: &CancelHandle,
    ) -> ResponseOutcome {
        let timeout_ms = if timeout_ms == 0 {
            DEFAULT_TIMEOUT_MS
        } else {
            timeout_ms
        };
        let start = Instant::now();

        log::debug!(
            "Dispatching {} {} ({} header(s), timeout {}ms)",
            request.method,
            request.url,
            request.headers.len(),
            timeout_ms
        );

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RequestError::Aborted),
            timed = tokio::time::timeout(Duration::from_millis(timeout_ms), self.execute(request)) => {
                match timed {
                    Ok(result) => result,
                    Err(_) => Err(RequestError::Timeout(timeout_ms)),
                }
            }
        };

        cancel.mark_completed();
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(raw) => {
                let data = normalize_response(raw, elapsed_ms);
                log::debug!(
                    "{} {} -> {} {} in {}ms",
                    request.method,
                    request.url,
                    data.status,
                    data.status_text,
                    elapsed_ms
                );
                ResponseOutcome::Success(data)
            }
            Err(err) => {
                log::debug!(
                    "{} {} failed after {}ms: {}",
                    request.method,
                    request.url,
                    elapsed_ms,
                    err
                );
                ResponseOutcome::Failure(err.into_failure(elapsed_ms))
            }
        }
    }

    /// Starts a dispatch on the current tokio runtime.
    ///
    /// Returns immediately with an [`InFlight`] that can be cancelled or awaited.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(&self, request: CompiledRequest, timeout_ms: u64) -> InFlight {
        let cancel = CancelHandle::new();
        let dispatcher = self.clone();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            dispatcher
                .dispatch_with_cancel(&request, timeout_ms, &task_cancel)
                .await
        });

        InFlight { cancel, task }
    }

    async fn execute(&self, request: &CompiledRequest) -> Result<RawResponse, RequestError> {
        let url = url::Url::parse(&request.url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(RequestError::UnsupportedProtocol(url.scheme().to_string()));
        }

        let mut req_builder = self.client.request(to_reqwest_method(request.method), url);

        for (name, value) in &request.headers {
            req_builder = req_builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        let response = req_builder.send().await?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("Unknown").to_string();

        // Repeated headers collapse to their last value
        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            headers.insert(
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }

        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status: status.as_u16(),
            status_text,
            headers,
            body,
        })
    }
}

/// A dispatch running in the background.
#[derive(Debug)]
pub struct InFlight {
    cancel: CancelHandle,
    task: tokio::task::JoinHandle<ResponseOutcome>,
}

impl InFlight {
    /// Assembles an in-flight dispatch from a handle and the task driving it.
    pub(crate) fn from_parts(
        cancel: CancelHandle,
        task: tokio::task::JoinHandle<ResponseOutcome>,
    ) -> Self {
        Self { cancel, task }
    }

    /// A handle that can cancel this dispatch from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn request_id(&self) -> &str {
        self.cancel.request_id()
    }

    /// Cancels the dispatch. See [`CancelHandle::cancel`].
    pub fn cancel(&self) -> bool {
        self.cancel.cancel()
    }

    /// Waits for the outcome.
    pub async fn outcome(self) -> ResponseOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("Dispatch task did not complete: {}", err);
                ResponseOutcome::Failure(ResponseFailure {
                    kind: crate::models::FailureKind::Aborted,
                    message: format!("Dispatch task did not complete: {}", err),
                    elapsed_ms: 0,
                })
            }
        }
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::PATCH => reqwest::Method::PATCH,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
    }
}

/// Builds the success value from a raw response.
///
/// JSON content types are parsed; a body that fails to parse is kept as text
/// and flagged as degraded. An empty body is always empty text.
fn normalize_response(raw: RawResponse, elapsed_ms: u64) -> ResponseData {
    let content_type = raw
        .headers
        .get("content-type")
        .map(String::as_str);
    let format = ResponseFormat::detect(content_type);
    let size = raw.body.len();

    let (data, parse_degraded) = if format == ResponseFormat::Json && !raw.body.is_empty() {
        match serde_json::from_slice(&raw.body) {
            Ok(value) => (ResponseBody::Json(value), false),
            Err(err) => {
                log::warn!("Response declared JSON but failed to parse: {}", err);
                (
                    ResponseBody::Text(String::from_utf8_lossy(&raw.body).into_owned()),
                    true,
                )
            }
        }
    } else {
        (
            ResponseBody::Text(String::from_utf8_lossy(&raw.body).into_owned()),
            false,
        )
    };

    ResponseData {
        status: raw.status,
        status_text: raw.status_text,
        headers: raw.headers,
        data,
        elapsed_ms,
        size,
        format,
        parse_degraded,
    }
}
