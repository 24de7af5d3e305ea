//! Request compiler.
//!
//! Turns a [`RequestDescription`] plus a snapshot of the active environment's
//! bindings into a [`CompiledRequest`]:
//!
//! 1. Placeholders are resolved in the URL, enabled header and parameter values,
//!    the auth fields and the body.
//! 2. Disabled rows and rows with a blank key are dropped.
//! 3. Parameters are percent-encoded and appended to the URL, after any query the
//!    URL already carries.
//! 4. The auth configuration contributes its header unless the user set that
//!    header explicitly.
//! 5. A Content-Type is derived from the body type when none is present.
//! 6. The body is dropped for GET, HEAD, OPTIONS and DELETE.
//!
//! Compilation is total and pure. An unusable URL surfaces at dispatch time.

pub mod query;

use crate::auth::{auth_header, resolve_auth};
use crate::models::{CompiledRequest, RequestDescription};
use crate::variables::{resolve, Bindings};

/// Compiles a description against the given bindings.
///
/// # Examples
///
/// ```
/// use apicraft::compiler::compile;
/// use apicraft::models::{HttpMethod, RequestDescription};
/// use apicraft::variables::Bindings;
///
/// let mut bindings = Bindings::new();
/// bindings.insert("host".to_string(), "api.example.com".to_string());
///
/// let description = RequestDescription::new(HttpMethod::GET, "https://{{host}}/users")
///     .with_param("page", "2");
///
/// let compiled = compile(&description, &bindings);
/// assert_eq!(compiled.url, "https://api.example.com/users?page=2");
/// ```
pub fn compile(description: &RequestDescription, bindings: &Bindings) -> CompiledRequest {
    let params: Vec<(String, String)> = description
        .params
        .iter()
        .filter(|param| param.is_active())
        .map(|param| (param.key.clone(), resolve(&param.value, bindings)))
        .collect();

    let url = query::append_query(
        &resolve(&description.url, bindings),
        &query::build_query_string(&params),
    );

    let mut headers: Vec<(String, String)> = description
        .headers
        .iter()
        .filter(|header| header.is_active())
        .map(|header| (header.key.trim().to_string(), resolve(&header.value, bindings)))
        .collect();

    if let Some((name, value)) = auth_header(&resolve_auth(&description.auth, bindings)) {
        if !contains_header(&headers, &name) {
            headers.push((name, value));
        }
    }

    if !contains_header(&headers, "content-type") {
        if let Some(content_type) = description.body_type.default_content_type() {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
    }

    let body = if description.method.allows_body() && !description.body.is_empty() {
        Some(resolve(&description.body, bindings))
    } else {
        None
    };

    CompiledRequest {
        method: description.method,
        url,
        headers,
        body,
    }
}

/// Compiles with no active environment; placeholders stay verbatim.
pub fn compile_without_environment(description: &RequestDescription) -> CompiledRequest {
    compile(description, &Bindings::new())
}

fn contains_header(headers: &[(String, String)], name: &str) -> bool {
    headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
}
