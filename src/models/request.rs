//! HTTP request data models.
//!
//! This module defines the user-authored [`RequestDescription`] (unresolved, may
//! contain `{{name}}` placeholders) and the [`CompiledRequest`] that the compiler
//! derives from it for a single dispatch.

use serde::{Deserialize, Serialize};

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// HTTP request method.
///
/// The methods an API tester lets the user pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// HTTP GET method - retrieve a resource
    GET,
    /// HTTP POST method - submit data to create a resource
    POST,
    /// HTTP PUT method - replace a resource
    PUT,
    /// HTTP PATCH method - partially modify a resource
    PATCH,
    /// HTTP DELETE method - remove a resource
    DELETE,
    /// HTTP HEAD method - retrieve headers only
    HEAD,
    /// HTTP OPTIONS method - describe communication options
    OPTIONS,
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    /// Parses a string into an HttpMethod (case-insensitive).
    ///
    /// # Returns
    ///
    /// `Some(HttpMethod)` if the string is a supported method, `None` otherwise.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "PATCH" => Some(HttpMethod::PATCH),
            "DELETE" => Some(HttpMethod::DELETE),
            "HEAD" => Some(HttpMethod::HEAD),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }

    /// Whether a request body is sent for this method.
    ///
    /// Only POST, PUT and PATCH carry a body; for the others any typed body is
    /// dropped at compile time.
    pub fn allows_body(&self) -> bool {
        matches!(self, HttpMethod::POST | HttpMethod::PUT | HttpMethod::PATCH)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the header or query parameter table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValuePair {
    /// Row identifier, only meaningful to the editing UI.
    #[serde(default)]
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl KeyValuePair {
    /// Creates an enabled row.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    /// Creates a row that is present in the table but switched off.
    pub fn disabled(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(key, value)
        }
    }

    /// A row takes part in compilation only when enabled and keyed.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.key.trim().is_empty()
    }
}

/// Declared body type. Picks the default content type, never transforms the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    #[default]
    Json,
    Form,
    Text,
    Xml,
}

impl BodyType {
    /// Content type to set when the user has not provided one.
    ///
    /// `form` and `text` return `None` and leave the choice to the transport.
    pub fn default_content_type(&self) -> Option<&'static str> {
        match self {
            BodyType::Json => Some("application/json"),
            BodyType::Xml => Some("application/xml"),
            BodyType::Form | BodyType::Text => None,
        }
    }
}

/// Client-side authentication configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AuthConfig {
    /// No authentication header is derived.
    #[default]
    None,
    /// HTTP Basic authentication (RFC 7617)
    Basic { username: String, password: String },
    /// Bearer token authentication (RFC 6750)
    Bearer { token: String },
    /// Arbitrary header carrying an API key
    ApiKey {
        #[serde(rename = "headerName")]
        header_name: String,
        value: String,
    },
}

/// The user-authored, unresolved request.
///
/// URL, header values, parameter values and body may contain `{{name}}`
/// placeholders; they are resolved by [`crate::compiler::compile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescription {
    pub method: HttpMethod,

    pub url: String,

    /// Header rows in user order. Duplicate keys are kept and all sent.
    #[serde(default)]
    pub headers: Vec<KeyValuePair>,

    /// Query parameter rows in user order.
    #[serde(default)]
    pub params: Vec<KeyValuePair>,

    /// Raw body text. Only sent for POST, PUT and PATCH.
    #[serde(default)]
    pub body: String,

    #[serde(default)]
    pub body_type: BodyType,

    #[serde(default)]
    pub auth: AuthConfig,

    /// Timeout for a single dispatch, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl RequestDescription {
    /// Creates a description with no headers, params, body or auth.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            params: Vec::new(),
            body: String::new(),
            body_type: BodyType::default(),
            auth: AuthConfig::None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(KeyValuePair::new(key, value));
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(KeyValuePair::new(key, value));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>, body_type: BodyType) -> Self {
        self.body = body.into();
        self.body_type = body_type;
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Timeout to enforce at dispatch. A zero value falls back to the default.
    pub fn effective_timeout_ms(&self) -> u64 {
        if self.timeout_ms == 0 {
            DEFAULT_TIMEOUT_MS
        } else {
            self.timeout_ms
        }
    }
}

/// A fully resolved request, ready for dispatch.
///
/// Produced fresh per send by the compiler. Headers keep insertion order and may
/// contain repeated names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledRequest {
    pub method: HttpMethod,

    /// URL with placeholders resolved and query parameters appended.
    pub url: String,

    pub headers: Vec<(String, String)>,

    /// `None` when the method carries no body or the body is empty.
    pub body: Option<String>,
}

impl CompiledRequest {
    /// Gets the first header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Checks whether a header with the given name is present (case-insensitive).
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// Gets the Content-Type header value if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Checks if the request has a non-empty body.
    pub fn has_body(&self) -> bool {
        self.body.as_ref().map_or(false, |b| !b.is_empty())
    }
}
