use super::base::{Provider, Usage};
use super::configs::OllamaProviderConfig;
use super::utils::{get_openai_usage, messages_to_openai_spec, openai_response_to_message};
use crate::models::message::Message;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use std::time::Duration;

pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "llama3.1";

pub struct OllamaProvider {
    client: Client,
    config: OllamaProviderConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> Result<Self> {
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

        let response = self.client.post(&url).json(&payload).send().await?;

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
impl Provider for OllamaProvider {
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

        let response = self.post(Value::Object(payload)).await?;

        let usage = get_openai_usage(&response).unwrap_or_default();
        let message = openai_response_to_message(response)?;

        Ok((message, usage))
    }
}
