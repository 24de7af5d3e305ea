//! Placeholder substitution.
//!
//! Replaces `{{name}}` placeholders with values from the active environment's
//! bindings. Substitution is a single textual pass: substituted values are never
//! rescanned, so a value that itself looks like `{{other}}` is inserted as-is.
//! Placeholders with no binding are left verbatim.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};

/// Name → value bindings taken from an environment.
pub type Bindings = HashMap<String, String>;

/// Cached regex for `{{name}}`. Braces are excluded from the name so that
/// `{{{x}}}` still finds the inner `{{x}}`.
static VARIABLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("Failed to compile variable regex"));

/// Substitutes every bound `{{name}}` in `text`.
///
/// # Examples
///
/// ```
/// use apicraft::variables::{resolve, Bindings};
///
/// let mut bindings = Bindings::new();
/// bindings.insert("host".to_string(), "api.example.com".to_string());
///
/// assert_eq!(
///     resolve("https://{{host}}/users/{{id}}", &bindings),
///     "https://api.example.com/users/{{id}}"
/// );
/// ```
pub fn resolve(text: &str, bindings: &Bindings) -> String {
    // Fast path: nothing to substitute
    if bindings.is_empty() || !text.contains("{{") {
        return text.to_string();
    }

    VARIABLE_REGEX
        .replace_all(text, |caps: &Captures| match bindings.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Like [`resolve`], but the identity when no environment is active.
pub fn resolve_optional(text: &str, bindings: Option<&Bindings>) -> String {
    match bindings {
        Some(bindings) => resolve(text, bindings),
        None => text.to_string(),
    }
}

/// Lists placeholder names in order of first appearance, without duplicates.
pub fn find_placeholders(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    VARIABLE_REGEX
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Lists placeholders in `text` that `bindings` cannot satisfy.
pub fn unresolved_placeholders(text: &str, bindings: &Bindings) -> Vec<String> {
    find_placeholders(text)
        .into_iter()
        .filter(|name| !bindings.contains_key(name))
        .collect()
}
