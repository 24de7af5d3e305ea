//! Request export as runnable snippets.
//!
//! Turns a [`CompiledRequest`] into something a user can paste elsewhere: a
//! cURL command, a JavaScript `fetch()` call or a Python `requests` script.
//! Exports work on the compiled form, so placeholders are already resolved
//! and auth headers are already attached.
//!
//! # Example
//!
//! ```
//! use apicraft::export::{export, ExportFormat};
//! use apicraft::models::{CompiledRequest, HttpMethod};
//!
//! let request = CompiledRequest {
//!     method: HttpMethod::GET,
//!     url: "https://api.example.com/health".to_string(),
//!     headers: Vec::new(),
//!     body: None,
//! };
//!
//! assert_eq!(export(&request, ExportFormat::Curl), "curl https://api.example.com/health");
//! ```

pub mod curl;
pub mod fetch;
pub mod python;

pub use curl::{to_curl, to_curl_compact, to_curl_with_options, CurlOptions};
pub use fetch::to_fetch;
pub use python::to_python;

use crate::models::CompiledRequest;
use serde::{Deserialize, Serialize};

/// Target format for [`export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportFormat {
    Curl,
    Fetch,
    Python,
}

impl ExportFormat {
    /// Parses a format name such as `curl`, `js`/`fetch` or `py`/`python`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "curl" => Some(ExportFormat::Curl),
            "fetch" | "js" | "javascript" => Some(ExportFormat::Fetch),
            "python" | "py" => Some(ExportFormat::Python),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Curl => "curl",
            ExportFormat::Fetch => "fetch",
            ExportFormat::Python => "python",
        }
    }
}

/// Renders the request in the given format.
pub fn export(request: &CompiledRequest, format: ExportFormat) -> String {
    match format {
        ExportFormat::Curl => to_curl(request),
        ExportFormat::Fetch => to_fetch(request),
        ExportFormat::Python => to_python(request),
    }
}

/// Pretty JSON for the body when the request declares a JSON content type
/// and the body actually parses.
pub(crate) fn pretty_json(request: &CompiledRequest, body: &str) -> Option<String> {
    let is_json = request
        .content_type()
        .map(|ct| ct.to_lowercase().contains("json"))
        .unwrap_or(false);
    if !is_json {
        return None;
    }

    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

/// Indents every line after the first.
pub(crate) fn indent_continuation(text: &str, indent: &str) -> String {
    text.replace('\n', &format!("\n{}", indent))
}
