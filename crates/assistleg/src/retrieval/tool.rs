use std::sync::Arc;

use super::normalize::normalize;
use super::retriever::Retriever;
use crate::errors::{AgentError, AgentResult};

/// Retrieval bound to one topic, returning prompt-ready text
#[derive(Clone)]
pub struct RetrievalTool {
    topic: String,
    retriever: Arc<dyn Retriever>,
}

impl RetrievalTool {
    pub fn new(topic: impl Into<String>, retriever: Arc<dyn Retriever>) -> Self {
        Self {
            topic: topic.into(),
            retriever,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Query the index and normalize the result, reporting collaborator failures
    pub async fn try_retrieve(&self, query: &str) -> AgentResult<String> {
        let raw = self
            .retriever
            .retrieve(query)
            .await
            .map_err(|e| AgentError::Retrieval(e.to_string()))?;
        Ok(normalize(&raw))
    }

    /// Best-effort retrieval: any failure is logged and yields empty text
    pub async fn retrieve(&self, query: &str) -> String {
        match self.try_retrieve(query).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(topic = %self.topic, error = %e, "retrieval failed, continuing without context");
                String::new()
            }
        }
    }
}
