use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use std::time::Duration;

use super::base::{Provider, Usage};
use super::configs::OpenAiProviderConfig;
use super::utils::{
    check_openai_context_length_error, get_openai_usage, messages_to_openai_spec,
    openai_response_to_message,
};
use crate::models::message::Message;

/// Groq serves an openai-compatible api under this prefix
pub const GROQ_HOST: &str = "https://api.groq.com/openai";
pub const GROQ_MODEL: &str = "llama-3.1-8b-instant";

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            status => Err(anyhow!("Request failed: {}", status)),
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, messages: &[Message]) -> Result<(Message, Usage)> {
        let mut payload = Map::new();
        payload.insert("model".to_string(), json!(self.config.model));
        payload.insert(
            "messages".to_string(),
            json!(messages_to_openai_spec(messages)),
        );
        if let Some(temp) = self.config.temperature {
            payload.insert("temperature".to_string(), json!(temp));
        }
        if let Some(tokens) = self.config.max_tokens {
            payload.insert("max_tokens".to_string(), json!(tokens));
        }

        tracing::debug!(model = %self.config.model, messages = messages.len(), "chat completion request");
        let response = self.post(Value::Object(payload)).await?;

        // Raise specific error if context length is exceeded
        if let Some(error) = response.get("error") {
            if let Some(err) = check_openai_context_length_error(error) {
                return Err(err.into());
            }
            return Err(anyhow!("OpenAI API error: {}", error));
        }

        let usage = get_openai_usage(&response).unwrap_or_default();
        let message = openai_response_to_message(response)?;

        Ok((message, usage))
    }
}
