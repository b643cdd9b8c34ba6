//! Transcript rendering for conversation history.
use serde_json::{json, Value};

use crate::models::turn::Turn;

/// Render a loosely shaped history into a transcript.
///
/// Accepts `null`, a ready-made string, or a list whose entries are `{role, content}`
/// objects, `[role, content]` pairs or anything else (rendered as-is).
pub fn render(history: &Value) -> String {
    match history {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(entries) => entries
            .iter()
            .map(render_entry)
            .collect::<Vec<_>>()
            .join("\n"),
        other => render_entry(other),
    }
}

/// Render recorded turns, one `Role: content` line each
pub fn render_turns(turns: &[Turn]) -> String {
    let entries = turns
        .iter()
        .map(|turn| json!({"role": turn.role.as_str(), "content": turn.content}))
        .collect();
    render(&Value::Array(entries))
}

fn render_entry(entry: &Value) -> String {
    match entry {
        Value::Object(map) => {
            let role = map.get("role").map(plain).unwrap_or_else(|| "user".to_string());
            let content = map.get("content").map(plain).unwrap_or_default();
            format_line(&role, &content)
        }
        Value::Array(pair) if pair.len() >= 2 => format_line(&plain(&pair[0]), &plain(&pair[1])),
        other => plain(other),
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn format_line(role: &str, content: &str) -> String {
    format!("{}: {}", capitalize(role), content)
}

/// First character upper-cased, the rest lower-cased
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
