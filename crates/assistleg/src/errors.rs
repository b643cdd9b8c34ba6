use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, Deserialize, Serialize)]
pub enum AgentError {
    #[error("No index found for topic '{topic}' (expected at {})", path.display())]
    TopicNotFound { topic: String, path: PathBuf },

    #[error("Invalid topic name: {0}")]
    InvalidTopic(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Prompt rendering failed: {0}")]
    Prompt(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
