use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use crate::models::message::Message;
use crate::providers::base::{Provider, Usage};

/// A mock provider that returns pre-configured responses and records every request
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Result<Message, String>>>>,
    calls: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    /// Create a mock provider whose responses may also be errors
    pub fn with_results(responses: Vec<Result<Message, String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider that fails every request
    pub fn failing(reason: &str) -> Self {
        Self::with_results(vec![Err(reason.to_string())])
    }

    /// The message sequences received so far, in call order
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, messages: &[Message]) -> Result<(Message, Usage)> {
        self.calls.lock().unwrap().push(messages.to_vec());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            return Ok((Message::assistant().with_text(""), Usage::default()));
        }
        // A single scripted error keeps failing
        if responses.len() == 1 && responses[0].is_err() {
            let reason = responses[0].clone().unwrap_err();
            return Err(anyhow!(reason));
        }
        match responses.remove(0) {
            Ok(message) => Ok((message, Usage::default())),
            Err(reason) => Err(anyhow!(reason)),
        }
    }
}
