//! Block tree → HTML.
//!
//! The encoder walks raw JSON rather than the typed [`Block`] model so that block trees
//! coming straight from the repository (with extra attributes or node types the model does
//! not know) still render. Unknown nodes contribute their children, or their `text`.

use serde_json::Value;

use super::Block;

/// Encodes typed blocks as HTML.
pub fn encode(blocks: &[Block]) -> String {
    match serde_json::to_value(blocks) {
        Ok(value) => encode_value(&value),
        Err(_) => String::new(),
    }
}

/// Encodes a block tree held as JSON. Anything other than an array yields an empty string.
pub fn encode_value(value: &Value) -> String {
    let Some(nodes) = value.as_array() else {
        return String::new();
    };
    let mut html = String::new();
    for node in nodes {
        encode_node(node, &mut html);
    }
    html
}

fn encode_node(node: &Value, out: &mut String) {
    let Some(kind) = node.get("type").and_then(Value::as_str) else {
        encode_children(node, out);
        return;
    };

    match kind {
        "paragraph" => wrap("p", node, out),
        "heading" => {
            let level = node
                .get("level")
                .and_then(Value::as_u64)
                .unwrap_or(1)
                .clamp(1, 6);
            wrap(&format!("h{}", level), node, out);
        }
        "list" => {
            let tag = match node.get("format").and_then(Value::as_str) {
                Some("ordered") => "ol",
                _ => "ul",
            };
            wrap(tag, node, out);
        }
        "list-item" => wrap("li", node, out),
        "quote" => wrap("blockquote", node, out),
        "code" => {
            let mut text = String::new();
            collect_text(node, &mut text);
            out.push_str("<pre><code>");
            out.push_str(&escape_text(&text));
            out.push_str("</code></pre>");
        }
        "image" => {
            let (url, alt) = image_attributes(node);
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\" />",
                escape_attribute(url),
                escape_attribute(alt)
            ));
        }
        "link" => {
            let url = node.get("url").and_then(Value::as_str).unwrap_or("#");
            out.push_str(&format!("<a href=\"{}\">", escape_attribute(url)));
            encode_children(node, out);
            out.push_str("</a>");
        }
        "text" => encode_text(node, out),
        _ => encode_children(node, out),
    }
}

fn wrap(tag: &str, node: &Value, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    encode_children(node, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn encode_children(node: &Value, out: &mut String) {
    match node.get("children").and_then(Value::as_array) {
        Some(children) => {
            for child in children {
                encode_node(child, out);
            }
        }
        None => {
            if let Some(text) = node.get("text").and_then(Value::as_str) {
                out.push_str(&escape_text(text));
            }
        }
    }
}

fn flag(node: &Value, name: &str) -> bool {
    node.get(name).and_then(Value::as_bool).unwrap_or(false)
}

// Marks wrap from the inside out: u, em, strong, code; `~~` goes around everything.
fn encode_text(node: &Value, out: &mut String) {
    let text = node.get("text").and_then(Value::as_str).unwrap_or_default();
    if text.is_empty() {
        return;
    }

    let mut html = escape_text(text);
    for (name, tag) in [
        ("underline", "u"),
        ("italic", "em"),
        ("bold", "strong"),
        ("code", "code"),
    ] {
        if flag(node, name) {
            html = format!("<{tag}>{html}</{tag}>");
        }
    }
    if flag(node, "strikethrough") {
        html = format!("~~{}~~", html);
    }
    out.push_str(&html);
}

fn collect_text(node: &Value, out: &mut String) {
    if let Some(text) = node.get("text").and_then(Value::as_str) {
        out.push_str(text);
    }
    if let Some(children) = node.get("children").and_then(Value::as_array) {
        for child in children {
            collect_text(child, out);
        }
    }
}

// Accepts both `{url, alt}` and the repository's `{image: {url, alternativeText}}` shape.
fn image_attributes(node: &Value) -> (&str, &str) {
    let nested = node.get("image");
    let url = node
        .get("url")
        .and_then(Value::as_str)
        .or_else(|| nested.and_then(|image| image.get("url")).and_then(Value::as_str))
        .unwrap_or_default();
    let alt = node
        .get("alt")
        .and_then(Value::as_str)
        .or_else(|| {
            nested
                .and_then(|image| image.get("alternativeText"))
                .and_then(Value::as_str)
        })
        .unwrap_or_default();
    (url, alt)
}

/// Escapes text content. `~` is escaped too so that literal tildes never read as `~~`.
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '~' => out.push_str("&#126;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
