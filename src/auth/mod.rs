//! Authentication header derivation.
//!
//! Turns a user-supplied [`AuthConfig`] into at most one request header. Incomplete
//! credentials (an empty username, password, token, header name or key value)
//! produce no header rather than a malformed one.

pub mod basic;
pub mod bearer;

use crate::models::AuthConfig;
use crate::variables::{resolve, Bindings};

/// Name of the header used by Basic and Bearer schemes.
pub const AUTHORIZATION: &str = "Authorization";

/// Header names whose values are credentials.
///
/// Used to keep secrets out of persisted history.
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "proxy-authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "api-key",
    "x-auth-token",
    "auth-token",
    "x-access-token",
    "access-token",
];

/// Checks whether a header name carries credentials (case-insensitive).
pub fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS
        .iter()
        .any(|sensitive| name.eq_ignore_ascii_case(sensitive))
}

/// Derives the header implied by an auth configuration.
///
/// # Returns
///
/// `Some((name, value))` when the configuration is complete, `None` for
/// [`AuthConfig::None`] or when a required field is empty.
///
/// # Examples
///
/// ```
/// use apicraft::auth::auth_header;
/// use apicraft::models::AuthConfig;
///
/// let auth = AuthConfig::Bearer { token: "abc".to_string() };
/// assert_eq!(
///     auth_header(&auth),
///     Some(("Authorization".to_string(), "Bearer abc".to_string()))
/// );
///
/// let empty = AuthConfig::Bearer { token: String::new() };
/// assert_eq!(auth_header(&empty), None);
/// ```
pub fn auth_header(auth: &AuthConfig) -> Option<(String, String)> {
    match auth {
        AuthConfig::None => None,
        AuthConfig::Basic { username, password } => {
            if username.is_empty() || password.is_empty() {
                return None;
            }
            Some((AUTHORIZATION.to_string(), basic::basic_auth(username, password)))
        }
        AuthConfig::Bearer { token } => {
            if token.is_empty() {
                return None;
            }
            Some((AUTHORIZATION.to_string(), bearer::bearer_token(token)))
        }
        AuthConfig::ApiKey { header_name, value } => {
            let header_name = header_name.trim();
            if header_name.is_empty() || value.is_empty() {
                return None;
            }
            Some((header_name.to_string(), value.clone()))
        }
    }
}

/// Returns a copy of `auth` with placeholders resolved in every field.
pub fn resolve_auth(auth: &AuthConfig, bindings: &Bindings) -> AuthConfig {
    match auth {
        AuthConfig::None => AuthConfig::None,
        AuthConfig::Basic { username, password } => AuthConfig::Basic {
            username: resolve(username, bindings),
            password: resolve(password, bindings),
        },
        AuthConfig::Bearer { token } => AuthConfig::Bearer {
            token: resolve(token, bindings),
        },
        AuthConfig::ApiKey { header_name, value } => AuthConfig::ApiKey {
            header_name: resolve(header_name, bindings),
            value: resolve(value, bindings),
        },
    }
}
