//! Normalized dispatch outcome.
//!
//! Every dispatch produces exactly one [`ResponseOutcome`]: a received HTTP
//! response of any status, or a transport-level failure. Both carry the elapsed
//! wall-clock time.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Display format inferred from the response content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Json,
    Xml,
    Html,
    Text,
    Raw,
}

impl ResponseFormat {
    /// Detects the format from a Content-Type header value.
    pub fn detect(content_type: Option<&str>) -> Self {
        let content_type = match content_type {
            Some(ct) => ct.to_ascii_lowercase(),
            None => return ResponseFormat::Raw,
        };

        if content_type.contains("application/json") || content_type.contains("+json") {
            ResponseFormat::Json
        } else if content_type.contains("application/xml") || content_type.contains("text/xml")
        {
            ResponseFormat::Xml
        } else if content_type.contains("text/html") {
            ResponseFormat::Html
        } else if content_type.contains("text/") {
            ResponseFormat::Text
        } else {
            ResponseFormat::Raw
        }
    }
}

/// Response payload: parsed JSON or raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Renders the body for display; JSON is pretty-printed.
    pub fn to_display_string(&self) -> String {
        match self {
            ResponseBody::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            ResponseBody::Text(text) => text.clone(),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(_) => None,
            ResponseBody::Text(text) => Some(text),
        }
    }
}

/// A received HTTP response, whatever its status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    /// HTTP status code (e.g., 200, 404, 500).
    pub status: u16,

    /// Canonical reason phrase for the status (e.g., "Not Found").
    pub status_text: String,

    /// Response headers flattened to one value per name; the last instance wins.
    pub headers: HashMap<String, String>,

    pub data: ResponseBody,

    /// Wall-clock time from dispatch start to completion.
    pub elapsed_ms: u64,

    /// Body size in bytes as received.
    pub size: usize,

    pub format: ResponseFormat,

    /// Set when the body claimed to be JSON but did not parse and was kept as text.
    #[serde(default)]
    pub parse_degraded: bool,
}

impl ResponseData {
    /// Checks if the response status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Checks if the response status indicates a redirection (3xx).
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Checks if the response status indicates a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Checks if the response status indicates a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Gets a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Gets the Content-Type header value if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// Classification of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// No response within the configured timeout.
    Timeout,
    /// Connection could not be established or was dropped, or the URL was unusable.
    Network,
    /// Cancelled by the caller.
    Aborted,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Aborted => write!(f, "aborted"),
        }
    }
}

/// A dispatch that produced no HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseFailure {
    pub kind: FailureKind,

    /// Human-readable description, always non-empty.
    pub message: String,

    pub elapsed_ms: u64,
}

/// Result of a single dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ResponseOutcome {
    Success(ResponseData),
    Failure(ResponseFailure),
}

impl ResponseOutcome {
    pub fn elapsed_ms(&self) -> u64 {
        match self {
            ResponseOutcome::Success(data) => data.elapsed_ms,
            ResponseOutcome::Failure(failure) => failure.elapsed_ms,
        }
    }

    /// HTTP status, absent for transport failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ResponseOutcome::Success(data) => Some(data.status),
            ResponseOutcome::Failure(_) => None,
        }
    }

    /// True when an HTTP response was received, including 4xx and 5xx.
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseOutcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ResponseOutcome::Failure(_))
    }

    pub fn as_success(&self) -> Option<&ResponseData> {
        match self {
            ResponseOutcome::Success(data) => Some(data),
            ResponseOutcome::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&ResponseFailure> {
        match self {
            ResponseOutcome::Success(_) => None,
            ResponseOutcome::Failure(failure) => Some(failure),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.as_failure().map(|f| f.kind)
    }
}
