use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::retriever::{HttpRetriever, Retriever, SearchParams};
use crate::errors::{AgentError, AgentResult};

/// Opens the retrieval collaborator for a topic whose index directory exists
pub trait RetrieverSource: Send + Sync {
    fn open(&self, topic: &str, index_dir: &Path) -> AgentResult<Arc<dyn Retriever>>;
}

/// Serves every topic from one retrieval service, one collection per topic
pub struct HttpRetrieverSource {
    host: String,
    search: SearchParams,
}

impl HttpRetrieverSource {
    pub fn new(host: impl Into<String>, search: SearchParams) -> Self {
        Self {
            host: host.into(),
            search,
        }
    }
}

impl RetrieverSource for HttpRetrieverSource {
    fn open(&self, topic: &str, _index_dir: &Path) -> AgentResult<Arc<dyn Retriever>> {
        let retriever = HttpRetriever::new(&self.host, topic, self.search.clone())
            .map_err(|e| AgentError::Internal(e.to_string()))?;
        Ok(Arc::new(retriever))
    }
}

/// The set of topic indexes produced by the offline ingestion pipeline, one
/// directory per topic under `root`.
pub struct TopicCatalog {
    root: PathBuf,
    source: Arc<dyn RetrieverSource>,
}

impl TopicCatalog {
    pub fn new(root: impl Into<PathBuf>, source: Arc<dyn RetrieverSource>) -> Self {
        Self {
            root: root.into(),
            source,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the index for `topic` is expected to live
    pub fn index_path(&self, topic: &str) -> AgentResult<PathBuf> {
        let topic = topic.trim();
        if topic.is_empty()
            || topic == "."
            || topic.contains("..")
            || topic.contains(['/', '\\'])
        {
            return Err(AgentError::InvalidTopic(topic.to_string()));
        }
        Ok(self.root.join(topic))
    }

    /// Bind a fresh retriever for `topic`. Nothing is cached between calls.
    pub fn resolve(&self, topic: &str) -> AgentResult<Arc<dyn Retriever>> {
        let path = self.index_path(topic)?;
        if !path.is_dir() {
            return Err(AgentError::TopicNotFound {
                topic: topic.trim().to_string(),
                path,
            });
        }
        tracing::info!(topic = topic.trim(), path = %path.display(), "loading topic index");
        self.source.open(topic.trim(), &path)
    }

    /// Names of all topics with an index directory, sorted
    pub fn topics(&self) -> AgentResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.root).map_err(|e| {
            AgentError::Internal(format!("Cannot read {}: {}", self.root.display(), e))
        })?;

        let mut topics = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AgentError::Internal(e.to_string()))?;
            if entry.path().is_dir() {
                topics.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        topics.sort();
        Ok(topics)
    }
}
