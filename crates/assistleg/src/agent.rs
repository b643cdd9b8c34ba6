use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::{AgentError, AgentResult};
use crate::executor::{TurnExecutor, TurnOutcome};
use crate::memory::{ConversationStore, WithMemory};
use crate::models::turn::Turn;
use crate::policy::{KeywordTrigger, RetrievalPolicy};
use crate::prompt_template::{load_bundled_prompt, load_prompt_file};
use crate::providers::base::Provider;
use crate::retrieval::{RetrievalTool, TopicCatalog};

/// Session used when the caller does not name one
pub const DEFAULT_SESSION: &str = "default";

pub const DEFAULT_JURISDICTION: &str = "colombiano";

/// What an agent is bound to. Fixed once the agent exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentConfig {
    pub topic: String,
}

#[derive(Serialize)]
struct InstructionsContext<'a> {
    jurisdiction: &'a str,
}

/// Render the system instructions from the `template` file when given, else the bundled prompt
pub fn system_instructions(template: Option<PathBuf>, jurisdiction: &str) -> AgentResult<String> {
    let context = InstructionsContext { jurisdiction };
    let rendered = match template {
        Some(path) => load_prompt_file(path, &context),
        None => load_bundled_prompt("legal_system.md", &context),
    }
    .map_err(|e| AgentError::Prompt(e.to_string()))?;
    Ok(rendered.trim().to_string())
}

/// A conversational agent answering questions about one topic
pub struct LegalAgent {
    config: AgentConfig,
    pipeline: WithMemory<TurnExecutor>,
}

impl LegalAgent {
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn topic(&self) -> &str {
        &self.config.topic
    }

    /// Answer a question within a session, recording the exchange
    pub async fn ask(&self, session_id: &str, question: &str) -> TurnOutcome {
        self.pipeline.invoke(session_id, question).await
    }

    /// Like [`LegalAgent::ask`] but only the answer text
    pub async fn invoke(&self, session_id: &str, question: &str) -> String {
        self.ask(session_id, question).await.into_text()
    }

    pub async fn history(&self, session_id: &str) -> Vec<Turn> {
        self.pipeline.store().history(session_id).await
    }
}

/// Builds agents for topics in a catalog, all sharing one model and one memory store
pub struct AgentFactory {
    provider: Arc<dyn Provider>,
    catalog: TopicCatalog,
    policy: Arc<dyn RetrievalPolicy>,
    store: Arc<ConversationStore>,
    instructions: String,
}

impl AgentFactory {
    pub fn new(provider: Arc<dyn Provider>, catalog: TopicCatalog) -> AgentResult<Self> {
        Ok(Self {
            provider,
            catalog,
            policy: Arc::new(KeywordTrigger::default()),
            store: ConversationStore::global(),
            instructions: system_instructions(None, DEFAULT_JURISDICTION)?,
        })
    }

    pub fn with_policy(mut self, policy: Arc<dyn RetrievalPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_store(mut self, store: Arc<ConversationStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    /// Bind a new agent to `topic`. Fails when the topic has no index.
    pub fn build(&self, topic: &str) -> AgentResult<LegalAgent> {
        let retriever = self.catalog.resolve(topic)?;
        let config = AgentConfig {
            topic: topic.trim().to_string(),
        };

        let executor = TurnExecutor::new(
            self.provider.clone(),
            RetrievalTool::new(config.topic.clone(), retriever),
            self.policy.clone(),
            self.instructions.clone(),
        );
        tracing::info!(topic = %config.topic, "legal agent ready");

        Ok(LegalAgent {
            config,
            pipeline: WithMemory::new(executor, self.store.clone()),
        })
    }
}
