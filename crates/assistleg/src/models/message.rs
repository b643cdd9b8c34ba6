use super::role::Role;
use chrono::Utc;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
/// Content passed inside a message
pub enum MessageContent {
    Text(String),
    /// A content part the provider returned in a shape we do not model
    Raw(Value),
}

impl MessageContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        MessageContent::Text(text.into())
    }

    pub fn raw(value: Value) -> Self {
        MessageContent::Raw(value)
    }

    /// Get the text content if this is a Text variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
/// A message to or from an LLM
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: Vec<MessageContent>,
}

impl Message {
    fn with_role(role: Role) -> Self {
        Message {
            role,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    /// Create a new system message with the current timestamp
    pub fn system() -> Self {
        Self::with_role(Role::System)
    }

    /// Create a new user message with the current timestamp
    pub fn user() -> Self {
        Self::with_role(Role::User)
    }

    /// Create a new assistant message with the current timestamp
    pub fn assistant() -> Self {
        Self::with_role(Role::Assistant)
    }

    /// Add any MessageContent to the message
    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content.push(content);
        self
    }

    /// Add text content to the message
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(MessageContent::text(text))
    }

    /// Concatenated text parts, ignoring anything else
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|content| content.as_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The answer carried by this message: its text parts when it has any, otherwise the
    /// string form of whatever raw content came back.
    pub fn answer_text(&self) -> String {
        if self.content.iter().any(|c| c.as_text().is_some()) {
            return self.text();
        }
        self.content
            .iter()
            .map(|content| match content {
                MessageContent::Text(text) => text.clone(),
                MessageContent::Raw(Value::String(s)) => s.clone(),
                MessageContent::Raw(value) => value.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_builders() {
        let message = Message::system().with_text("rules").with_text("more rules");
        assert_eq!(message.role, Role::System);
        assert_eq!(message.content.len(), 2);
        assert_eq!(message.text(), "rules\nmore rules");
    }

    #[test]
    fn test_answer_text_prefers_text_parts() {
        let message = Message::assistant()
            .with_content(MessageContent::raw(json!({"type": "refusal"})))
            .with_text("Hola");
        assert_eq!(message.answer_text(), "Hola");
    }

    #[test]
    fn test_answer_text_falls_back_to_raw() {
        let message = Message::assistant()
            .with_content(MessageContent::raw(json!({"type": "output", "value": 1})));
        assert_eq!(message.answer_text(), r#"{"type":"output","value":1}"#);

        let empty = Message::assistant();
        assert_eq!(empty.answer_text(), "");
    }
}
