//! cURL command export.
//!
//! Renders a [`CompiledRequest`] as a shell-ready cURL invocation. Headers are
//! emitted in the order they will be sent, so duplicates survive the export.

use crate::models::{CompiledRequest, HttpMethod};

/// Commands longer than this are broken across lines.
const MAX_SINGLE_LINE: usize = 80;

/// Options for cURL command export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurlOptions {
    /// Emit a single line regardless of length.
    pub compact: bool,

    /// Include the verbose flag (`-v`).
    pub verbose: bool,

    /// Include the insecure flag (`-k`), mirroring a dispatcher that skips
    /// certificate validation.
    pub insecure: bool,
}

/// Renders the request as a cURL command, wrapped across lines when long.
///
/// # Arguments
///
/// * `request` - The compiled request to export
///
/// # Returns
///
/// A cURL command with POSIX single-quote escaping
///
/// # Examples
///
/// ```
/// use apicraft::export::to_curl;
/// use apicraft::models::{CompiledRequest, HttpMethod};
///
/// let request = CompiledRequest {
///     method: HttpMethod::POST,
///     url: "https://api.example.com/users".to_string(),
///     headers: vec![("Content-Type".to_string(), "application/json".to_string())],
///     body: Some(r#"{"name":"Ada"}"#.to_string()),
/// };
///
/// let curl = to_curl(&request);
/// assert!(curl.starts_with("curl -X POST"));
/// assert!(curl.contains("--data-raw"));
/// ```
pub fn to_curl(request: &CompiledRequest) -> String {
    to_curl_with_options(request, &CurlOptions::default())
}

/// Renders the request as a cURL command on a single line.
pub fn to_curl_compact(request: &CompiledRequest) -> String {
    to_curl_with_options(
        request,
        &CurlOptions {
            compact: true,
            ..CurlOptions::default()
        },
    )
}

/// Renders the request as a cURL command with explicit options.
pub fn to_curl_with_options(request: &CompiledRequest, options: &CurlOptions) -> String {
    let parts = command_parts(request, options);
    if options.compact {
        parts.join(" ")
    } else {
        format_multiline(&parts)
    }
}

/// Splits the command into flag groups, each kept together on one line.
fn command_parts(request: &CompiledRequest, options: &CurlOptions) -> Vec<String> {
    let mut parts = vec!["curl".to_string()];

    if options.verbose {
        parts.push("-v".to_string());
    }
    if options.insecure {
        parts.push("-k".to_string());
    }

    // GET is cURL's default
    if request.method != HttpMethod::GET {
        parts.push(format!("-X {}", request.method.as_str()));
    }

    for (name, value) in &request.headers {
        parts.push(format!(
            "-H {}",
            escape_shell_arg(&format!("{}: {}", name, value))
        ));
    }

    if let Some(body) = &request.body {
        parts.push(format!("--data-raw {}", escape_shell_arg(body)));
    }

    parts.push(escape_shell_arg(&request.url));
    parts
}

/// Quotes an argument for a POSIX shell.
///
/// Arguments without shell metacharacters are left bare. Everything else is
/// wrapped in single quotes, with embedded single quotes written as `'\''`.
pub(crate) fn escape_shell_arg(arg: &str) -> String {
    if needs_quoting(arg) {
        format!("'{}'", arg.replace('\'', "'\\''"))
    } else {
        arg.to_string()
    }
}

fn needs_quoting(s: &str) -> bool {
    const SPECIAL: &[char] = &[
        ' ', '\t', '\n', '\r', '|', '&', ';', '<', '>', '(', ')', '$', '`', '\\', '"', '\'', '*',
        '?', '[', ']', '#', '~', '=', '%', '{', '}', '!',
    ];

    s.is_empty() || s.chars().any(|c| SPECIAL.contains(&c))
}

/// Joins parts with backslash continuations once the command gets long.
fn format_multiline(parts: &[String]) -> String {
    let single_line = parts.join(" ");
    if single_line.len() <= MAX_SINGLE_LINE {
        return single_line;
    }

    parts.join(" \\\n  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: HttpMethod, url: &str) -> CompiledRequest {
        CompiledRequest {
            method,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn test_simple_get_has_no_method_flag() {
        let curl = to_curl(&request(HttpMethod::GET, "https://api.example.com/users"));
        assert_eq!(curl, "curl https://api.example.com/users");
    }

    #[test]
    fn test_post_with_body() {
        let mut req = request(HttpMethod::POST, "https://h/users");
        req.body = Some(r#"{"name":"Ada"}"#.to_string());

        let curl = to_curl_compact(&req);
        assert_eq!(
            curl,
            r#"curl -X POST --data-raw '{"name":"Ada"}' https://h/users"#
        );
    }

    #[test]
    fn test_headers_keep_order_and_duplicates() {
        let mut req = request(HttpMethod::GET, "https://h");
        req.headers = vec![
            ("X-B".to_string(), "2".to_string()),
            ("X-A".to_string(), "1".to_string()),
            ("X-B".to_string(), "3".to_string()),
        ];

        let curl = to_curl_compact(&req);
        let b2 = curl.find("'X-B: 2'").unwrap();
        let a1 = curl.find("'X-A: 1'").unwrap();
        let b3 = curl.find("'X-B: 3'").unwrap();
        assert!(b2 < a1 && a1 < b3);
    }

    #[test]
    fn test_query_string_is_quoted() {
        let curl = to_curl(&request(HttpMethod::GET, "https://h/s?q=a&b=c"));
        assert_eq!(curl, "curl 'https://h/s?q=a&b=c'");
    }

    #[test]
    fn test_escape_shell_arg() {
        assert_eq!(escape_shell_arg("simple"), "simple");
        assert_eq!(escape_shell_arg(""), "''");
        assert_eq!(escape_shell_arg("a b"), "'a b'");
        assert_eq!(escape_shell_arg("it's"), "'it'\\''s'");
        assert_eq!(escape_shell_arg("$HOME"), "'$HOME'");
    }

    #[test]
    fn test_long_command_wraps() {
        let mut req = request(
            HttpMethod::PUT,
            "https://api.example.com/v1/organizations/acme/projects/42",
        );
        req.headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), "Bearer abc.def.ghi".to_string()),
        ];
        req.body = Some("{}".to_string());

        let curl = to_curl(&req);
        let lines: Vec<&str> = curl.lines().collect();
        assert_eq!(lines[0], "curl \\");
        assert_eq!(lines[1], "  -X PUT \\");
        assert!(lines.last().unwrap().ends_with("/projects/42"));
        assert!(lines[..lines.len() - 1].iter().all(|l| l.ends_with(" \\")));
    }

    #[test]
    fn test_options_flags() {
        let options = CurlOptions {
            compact: true,
            verbose: true,
            insecure: true,
        };
        let curl = to_curl_with_options(&request(HttpMethod::GET, "https://h"), &options);
        assert_eq!(curl, "curl -v -k https://h");
    }
}
