//! Reduce whatever the retrieval service returned to plain prompt text.
//!
//! The service does not promise a result shape, so every shape maps to some string and
//! nothing in here can fail.
use serde_json::{Map, Value};

/// Flatten a retrieval result into text.
///
/// - `null` is empty
/// - strings are trimmed
/// - lists are joined line by line, skipping nulls
/// - objects are searched for `context`, `answer`, `texts` then `documents`,
///   then a `content` field
/// - anything else is stringified
pub fn normalize(result: &Value) -> String {
    match result {
        Value::Null => String::new(),
        Value::String(text) => text.trim().to_string(),
        Value::Array(items) => join_lines(items, stringify),
        Value::Object(map) => normalize_object(map)
            .unwrap_or_else(|| stringify(result))
            .trim()
            .to_string(),
        other => stringify(other).trim().to_string(),
    }
}

fn normalize_object(map: &Map<String, Value>) -> Option<String> {
    if let Some(text) = map.get("context").and_then(|v| text_or_lines(v, stringify)) {
        return Some(text);
    }

    if let Some(Value::String(answer)) = map.get("answer") {
        return Some(answer.trim().to_string());
    }

    if let Some(text) = map.get("texts").and_then(|v| text_or_lines(v, stringify)) {
        return Some(text);
    }

    if let Some(text) = map
        .get("documents")
        .and_then(|v| text_or_lines(v, document_text))
    {
        return Some(text);
    }

    map.get("content").map(stringify)
}

/// Text for a keyed field. Falsy values count as an empty list; other shapes are skipped.
fn text_or_lines(value: &Value, to_text: fn(&Value) -> String) -> Option<String> {
    match value {
        v if is_falsy(v) => Some(String::new()),
        Value::String(text) => Some(text.trim().to_string()),
        Value::Array(items) => Some(join_lines(items, to_text)),
        _ => None,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// A retrieved document is reduced to its page content when it has one
fn document_text(document: &Value) -> String {
    match document
        .get("page_content")
        .or_else(|| document.get("pageContent"))
    {
        Some(content) => stringify(content),
        None => stringify(document),
    }
}

fn join_lines(items: &[Value], to_text: fn(&Value) -> String) -> String {
    items
        .iter()
        .filter(|item| !item.is_null())
        .map(|item| to_text(item).trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
