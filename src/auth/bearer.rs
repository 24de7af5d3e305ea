//! Bearer token authentication (RFC 6750).

/// Formats a token into a Bearer authentication header value.
///
/// # Examples
///
/// ```
/// use apicraft::auth::bearer::bearer_token;
///
/// assert_eq!(bearer_token("abc123xyz"), "Bearer abc123xyz");
/// ```
pub fn bearer_token(token: &str) -> String {
    format!("Bearer {}", token)
}
