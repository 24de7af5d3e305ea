//! JavaScript `fetch()` snippet export.

use super::{indent_continuation, pretty_json};
use crate::models::CompiledRequest;

/// Renders the request as an async JavaScript function using `fetch()`.
///
/// JSON bodies are pretty-printed and passed through `JSON.stringify`; any
/// other body is emitted as a string literal.
pub fn to_fetch(request: &CompiledRequest) -> String {
    let method = request.method.as_str();
    let mut code = String::new();

    code.push_str(&format!("// {} {}\n", method, request.url));
    code.push_str("async function makeRequest() {\n");
    code.push_str("  const options = {\n");
    code.push_str(&format!("    method: '{}',\n", method));

    if !request.headers.is_empty() {
        code.push_str("    headers: {\n");
        for (name, value) in &request.headers {
            code.push_str(&format!(
                "      '{}': '{}',\n",
                escape_js_string(name),
                escape_js_string(value)
            ));
        }
        code.push_str("    },\n");
    }

    if let Some(body) = &request.body {
        match pretty_json(request, body) {
            Some(json) => {
                code.push_str("    body: JSON.stringify(");
                code.push_str(&indent_continuation(&json, "    "));
                code.push_str("),\n");
            }
            None => code.push_str(&format!("    body: '{}',\n", escape_js_string(body))),
        }
    }

    code.push_str("  };\n\n");
    code.push_str(&format!(
        "  const response = await fetch('{}', options);\n",
        escape_js_string(&request.url)
    ));
    code.push_str("  const contentType = response.headers.get('content-type') || '';\n");
    code.push_str("  const data = contentType.includes('json')\n");
    code.push_str("    ? await response.json()\n");
    code.push_str("    : await response.text();\n");
    code.push_str("  console.log(response.status, data);\n");
    code.push_str("  return data;\n");
    code.push_str("}\n\n");
    code.push_str("makeRequest().catch(console.error);\n");

    code
}

/// Escapes a string for a single-quoted JavaScript literal.
fn escape_js_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\'' => "\\'".to_string(),
            '\\' => "\\\\".to_string(),
            '\n' => "\\n".to_string(),
            '\r' => "\\r".to_string(),
            '\t' => "\\t".to_string(),
            c if c.is_control() => format!("\\u{:04x}", c as u32),
            c => c.to_string(),
        })
        .collect()
}
