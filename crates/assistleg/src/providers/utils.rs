use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use crate::models::message::{Message, MessageContent};
use crate::models::role::Role;

/// Convert internal Message format to OpenAI's API message specification
///   messages without any content are dropped, openai rejects them
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .filter_map(|message| {
            let content = message.answer_text();
            if content.is_empty() {
                return None;
            }
            Some(json!({
                "role": message.role.as_str(),
                "content": content,
            }))
        })
        .collect()
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: Value) -> Result<Message> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| anyhow!("No message in response: {}", response))?;

    let mut content = Vec::new();
    match original.get("content") {
        Some(Value::String(text)) => content.push(MessageContent::text(text.as_str())),
        // Some compatible servers answer with a list of typed parts
        Some(Value::Array(parts)) => {
            for part in parts {
                match part.get("text").and_then(|t| t.as_str()) {
                    Some(text) => content.push(MessageContent::text(text)),
                    None => content.push(MessageContent::raw(part.clone())),
                }
            }
        }
        Some(Value::Null) | None => {}
        Some(other) => content.push(MessageContent::raw(other.clone())),
    }

    Ok(Message {
        role: Role::Assistant,
        created: chrono::Utc::now().timestamp(),
        content,
    })
}

pub fn get_openai_usage(data: &Value) -> Result<super::base::Usage> {
    let usage = data
        .get("usage")
        .ok_or_else(|| anyhow!("No usage data in response"))?;

    let input_tokens = usage
        .get("prompt_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let output_tokens = usage
        .get("completion_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let total_tokens = usage
        .get("total_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32)
        .or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        });

    Ok(super::base::Usage::new(
        input_tokens,
        output_tokens,
        total_tokens,
    ))
}

#[derive(Debug, thiserror::Error)]
#[error("Context length exceeded. Message: {0}")]
pub struct ContextLengthExceededError(String);

pub fn check_openai_context_length_error(error: &Value) -> Option<ContextLengthExceededError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ContextLengthExceededError(message))
    } else {
        None
    }
}
