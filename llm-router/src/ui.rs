//! Minimal HTML page for browsers and the context-menu extension

use crate::outcome::RoutingOutcome;

const PAGE_STYLE: &str = "font-family: sans-serif; max-width: 900px; margin: 40px auto;";
const INPUT_STYLE: &str = "width: 100%; padding: 12px; font-size: 16px;";
const BUTTON_STYLE: &str = "margin-top: 12px; padding: 10px 14px;";
const ANSWER_STYLE: &str = "white-space: pre-wrap; font-size: 15px; line-height: 1.4; \
    padding: 14px; background: #f6f6f6; border-radius: 10px;";

/// Escape text for use inside HTML element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn page(query: Option<&str>, body: &str) -> String {
    let value = query
        .map(|q| format!(" value=\"{}\"", escape_html(q)))
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html><head><meta charset="utf-8"><title>LLM Router</title></head>
<body style="{PAGE_STYLE}">
  <h2>LLM Router</h2>
  <form method="GET" action="/ui">
    <input name="q"{value} style="{INPUT_STYLE}" placeholder="Ask something..." />
    <button style="{BUTTON_STYLE}">Ask</button>
  </form>
{body}</body></html>
"#
    )
}

/// Empty ask form
pub fn render_form() -> String {
    page(None, "")
}

/// Form pre-filled with `query`, followed by the routed answer
pub fn render_outcome(query: &str, outcome: &RoutingOutcome) -> String {
    let fallback = outcome
        .fallback_from()
        .map(|from| format!(" (fallback from <b>{}</b>)", escape_html(from)))
        .unwrap_or_default();

    let body = format!(
        "  <p style=\"color:#666;\">Provider: <b>{}</b>{} &bull; Latency: <b>{}</b> ms</p>\n  <pre style=\"{ANSWER_STYLE}\">{}</pre>\n",
        escape_html(outcome.backend_used()),
        fallback,
        outcome.latency_ms(),
        escape_html(outcome.answer()),
    );
    page(Some(query), &body)
}

/// Form pre-filled with `query`, followed by why routing failed
pub fn render_error(query: &str, message: &str) -> String {
    let body = format!(
        "  <p style=\"color:#a00;\">Error: {}</p>\n",
        escape_html(message)
    );
    page(Some(query), &body)
}
