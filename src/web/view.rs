//! Inspection page rendering.
//!
//! A plain string builder rather than a templating engine: the page is
//! one static form listing the current entries with a checkbox each and
//! two batch buttons posting `{allowed, deleted}` to the manage
//! endpoint.

use std::sync::Arc;

use crate::core::CapturedEntry;

pub fn render_manage_page(callback: &str, entries: &[Arc<CapturedEntry>]) -> String {
    let mut page = String::with_capacity(2048);
    page.push_str(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Request Outbox</title>\n<style>\n\
         body { font-family: sans-serif; margin: 2em; }\n\
         pre { background: #f4f4f4; padding: 1em; overflow-x: auto; }\n\
         .entry { margin-bottom: 1.5em; }\n\
         .captured-on { color: #666; font-size: 0.85em; }\n\
         </style>\n</head>\n<body>\n<h1>Request Outbox</h1>\n",
    );

    if entries.is_empty() {
        page.push_str("<p>No captured requests.</p>\n");
    }

    for entry in entries {
        page.push_str("<div class=\"entry\">\n");
        page.push_str(&format!(
            "<label><input type=\"checkbox\" name=\"entry\" value=\"{}\"> {}</label>\n",
            entry.id,
            escape(&entry.request_line())
        ));
        page.push_str(&format!(
            "<div class=\"captured-on\">captured {}</div>\n",
            entry.captured_on.to_rfc3339()
        ));
        page.push_str(&format!("<pre>{}</pre>\n", escape(&entry.format_for_display())));
        page.push_str("</div>\n");
    }

    page.push_str(&format!(
        "<button onclick=\"submitBatch('allowed')\">Release selected</button>\n\
         <button onclick=\"submitBatch('deleted')\">Delete selected</button>\n\
         <script>\n\
         async function submitBatch(kind) {{\n\
           const ids = Array.from(document.querySelectorAll('input[name=entry]:checked'))\n\
             .map(el => el.value);\n\
           const body = {{ allowed: [], deleted: [] }};\n\
           body[kind] = ids;\n\
           const response = await fetch('{}/manage', {{\n\
             method: 'POST',\n\
             headers: {{ 'Content-Type': 'application/json' }},\n\
             body: JSON.stringify(body)\n\
           }});\n\
           if (!response.ok) alert('manage failed: ' + response.status);\n\
           location.reload();\n\
         }}\n\
         </script>\n</body>\n</html>\n",
        escape(callback)
    ));

    page
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
