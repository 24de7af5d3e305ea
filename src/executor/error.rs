//! Dispatch error types.
//!
//! Errors are internal to the dispatcher: every `RequestError` is turned into a
//! [`ResponseFailure`] value before it leaves [`crate::executor::Dispatcher`].

use crate::models::{FailureKind, ResponseFailure};
use std::fmt;

/// Errors that can occur while dispatching a request.
#[derive(Debug)]
pub enum RequestError {
    /// Network error occurred during request execution.
    ///
    /// This includes connection failures, DNS resolution errors,
    /// and connections dropped mid-response.
    NetworkError(String),

    /// No full response arrived within the given number of milliseconds.
    Timeout(u64),

    /// The caller cancelled the request.
    Aborted,

    /// Invalid URL provided in the request.
    InvalidUrl(String),

    /// TLS/SSL error occurred during HTTPS connection.
    TlsError(String),

    /// Request building error, e.g. an invalid header name or value.
    BuildError(String),

    /// Only HTTP and HTTPS are supported.
    UnsupportedProtocol(String),
}

impl RequestError {
    /// Places this error in the three-way failure taxonomy.
    ///
    /// Everything that is neither a timeout nor a cancellation is a network
    /// error, including malformed URLs and TLS failures.
    pub fn kind(&self) -> FailureKind {
        match self {
            RequestError::Timeout(_) => FailureKind::Timeout,
            RequestError::Aborted => FailureKind::Aborted,
            RequestError::NetworkError(_)
            | RequestError::InvalidUrl(_)
            | RequestError::TlsError(_)
            | RequestError::BuildError(_)
            | RequestError::UnsupportedProtocol(_) => FailureKind::Network,
        }
    }

    /// Converts this error into the failure value returned to callers.
    pub fn into_failure(self, elapsed_ms: u64) -> ResponseFailure {
        ResponseFailure {
            kind: self.kind(),
            message: self.to_string(),
            elapsed_ms,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            RequestError::Timeout(ms) => write!(f, "Request timed out after {}ms", ms),
            RequestError::Aborted => write!(f, "Request was cancelled"),
            RequestError::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            RequestError::TlsError(msg) => write!(f, "TLS/SSL error: {}", msg),
            RequestError::BuildError(msg) => write!(f, "Request build error: {}", msg),
            RequestError::UnsupportedProtocol(protocol) => {
                write!(f, "Unsupported protocol: {}", protocol)
            }
        }
    }
}

impl std::error::Error for RequestError {}

/// Convert reqwest errors to RequestError.
///
/// reqwest's own timeout is not configured by the dispatcher, so `is_timeout`
/// only fires for a connect timeout; it carries no budget and reports 0.
impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            RequestError::Timeout(0)
        } else if err.is_builder() {
            RequestError::BuildError(message)
        } else if message.contains("certificate")
            || message.contains("TLS")
            || message.contains("SSL")
        {
            RequestError::TlsError(message)
        } else {
            RequestError::NetworkError(message)
        }
    }
}

/// Convert URL parsing errors to RequestError.
impl From<url::ParseError> for RequestError {
    fn from(err: url::ParseError) -> Self {
        RequestError::InvalidUrl(err.to_string())
    }
}
