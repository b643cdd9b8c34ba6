use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::history::render_turns;
use crate::models::message::Message;
use crate::models::turn::Turn;
use crate::policy::RetrievalPolicy;
use crate::prompt_template::load_bundled_prompt;
use crate::providers::base::Provider;
use crate::retrieval::RetrievalTool;

/// Reply to an empty question
pub const NO_INPUT_MESSAGE: &str = "No recibí ninguna pregunta.";

/// Reply when the language model could not be reached. Never carries error detail.
pub const APOLOGY_MESSAGE: &str =
    "Lo siento, ocurrió un error al procesar la consulta. Intenta de nuevo en unos segundos.";

/// How an answer relates to retrieved context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grounding {
    /// Context was retrieved and injected
    Retrieved,
    /// The question did not call for retrieval
    NotRequested,
    /// Retrieval was attempted but produced nothing usable
    Unavailable,
}

/// Result of one turn. Every variant has a user-facing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Answered { answer: String, grounding: Grounding },
    Failed,
    NoInput,
}

impl TurnOutcome {
    pub fn text(&self) -> &str {
        match self {
            TurnOutcome::Answered { answer, .. } => answer,
            TurnOutcome::Failed => APOLOGY_MESSAGE,
            TurnOutcome::NoInput => NO_INPUT_MESSAGE,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            TurnOutcome::Answered { answer, .. } => answer,
            other => other.text().to_string(),
        }
    }

    pub fn grounding(&self) -> Option<Grounding> {
        match self {
            TurnOutcome::Answered { grounding, .. } => Some(*grounding),
            _ => None,
        }
    }
}

/// Something that answers a question given the prior conversation
#[async_trait]
pub trait Respond: Send + Sync {
    async fn respond(&self, question: &str, history: &[Turn]) -> TurnOutcome;
}

#[derive(Serialize)]
struct QuestionContext<'a> {
    history: &'a str,
    question: &'a str,
}

/// Runs a single question through retrieval and the language model
pub struct TurnExecutor {
    provider: Arc<dyn Provider>,
    tool: RetrievalTool,
    policy: Arc<dyn RetrievalPolicy>,
    instructions: String,
}

impl TurnExecutor {
    pub fn new(
        provider: Arc<dyn Provider>,
        tool: RetrievalTool,
        policy: Arc<dyn RetrievalPolicy>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tool,
            policy,
            instructions: instructions.into(),
        }
    }

    pub fn topic(&self) -> &str {
        self.tool.topic()
    }

    /// Instructions first, then the retrieved context if any, then one user message
    /// holding the transcript and the question.
    pub fn build_messages(&self, question: &str, history: &[Turn], context: &str) -> Vec<Message> {
        let mut messages = vec![Message::system().with_text(self.instructions.as_str())];
        if !context.is_empty() {
            messages.push(Message::system().with_text(context));
        }
        let history_text = render_turns(history);
        messages.push(Message::user().with_text(render_question(&history_text, question)));
        messages
    }

    pub async fn execute(&self, question: &str, history: &[Turn]) -> TurnOutcome {
        let question = question.trim();
        if question.is_empty() {
            return TurnOutcome::NoInput;
        }

        let (context, grounding) = if self.policy.should_retrieve(question) {
            tracing::debug!(topic = %self.topic(), "retrieving context");
            let context = self.tool.retrieve(question).await;
            let grounding = if context.is_empty() {
                Grounding::Unavailable
            } else {
                Grounding::Retrieved
            };
            (context, grounding)
        } else {
            tracing::debug!(topic = %self.topic(), "answering without retrieval");
            (String::new(), Grounding::NotRequested)
        };

        let messages = self.build_messages(question, history, &context);

        match self.provider.complete(&messages).await {
            Ok((response, usage)) => {
                tracing::debug!(?usage, ?grounding, "turn answered");
                TurnOutcome::Answered {
                    answer: response.answer_text(),
                    grounding,
                }
            }
            Err(e) => {
                tracing::error!(topic = %self.topic(), error = %e, "language model call failed");
                TurnOutcome::Failed
            }
        }
    }
}

#[async_trait]
impl Respond for TurnExecutor {
    async fn respond(&self, question: &str, history: &[Turn]) -> TurnOutcome {
        self.execute(question, history).await
    }
}

/// The user-turn text. Falls back to plain concatenation if the template breaks.
fn render_question(history: &str, question: &str) -> String {
    let context = QuestionContext { history, question };
    match load_bundled_prompt("question.md", &context) {
        Ok(rendered) => rendered.trim().to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "question template failed, using plain prompt");
            format!("{}\n\n{}", history, question).trim().to_string()
        }
    }
}
