//! Python `requests` snippet export.

use super::pretty_json;
use crate::models::CompiledRequest;

/// Renders the request as a Python script using the `requests` library.
///
/// JSON bodies are passed via `json=` so the library serializes them;
/// anything else goes through `data=`.
pub fn to_python(request: &CompiledRequest) -> String {
    let method = request.method.as_str();
    let mut code = String::new();

    code.push_str(&format!("# {} {}\n", method, request.url));
    code.push_str("import requests\n\n");
    code.push_str(&format!("url = '{}'\n", escape_python_string(&request.url)));

    if request.headers.is_empty() {
        code.push_str("headers = {}\n");
    } else {
        code.push_str("headers = {\n");
        for (name, value) in &request.headers {
            code.push_str(&format!(
                "    '{}': '{}',\n",
                escape_python_string(name),
                escape_python_string(value)
            ));
        }
        code.push_str("}\n");
    }

    let body_arg = match &request.body {
        Some(body) => match pretty_json(request, body) {
            Some(json) => {
                code.push_str(&format!("payload = {}\n", python_literal(&json)));
                Some("json=payload")
            }
            None => {
                code.push_str(&format!("payload = '{}'\n", escape_python_string(body)));
                Some("data=payload")
            }
        },
        None => None,
    };

    code.push('\n');
    code.push_str(&format!(
        "response = requests.request('{}', url, headers=headers",
        method
    ));
    if let Some(arg) = body_arg {
        code.push_str(", ");
        code.push_str(arg);
    }
    code.push_str(", timeout=30)\n");
    code.push_str("print(response.status_code)\n");
    code.push_str("print(response.text)\n");

    code
}

/// Escapes a string for a single-quoted Python literal.
fn escape_python_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\'' => "\\'".to_string(),
            '\\' => "\\\\".to_string(),
            '\n' => "\\n".to_string(),
            '\r' => "\\r".to_string(),
            '\t' => "\\t".to_string(),
            c if c.is_control() => format!("\\x{:02x}", c as u32),
            c => c.to_string(),
        })
        .collect()
}

/// Converts pretty-printed JSON into an equivalent Python literal.
///
/// Only bare `true`, `false` and `null` tokens are rewritten; string contents
/// are left alone.
fn python_literal(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = json;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            rest = &rest[c.len_utf8()..];
            continue;
        }

        let replaced = [("true", "True"), ("false", "False"), ("null", "None")]
            .iter()
            .find(|(token, _)| rest.starts_with(*token));
        match replaced {
            Some((token, python)) => {
                out.push_str(python);
                rest = &rest[token.len()..];
            }
            None => {
                if c == '"' {
                    in_string = true;
                }
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    out
}
